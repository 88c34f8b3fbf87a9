//! Read-only catalog queries: filtering, sorting, paging, aggregates,
//! projections, relationship listings and generated SQL.

use crate::context::DataContext;
use crate::entity::{actor, creator, film};
use crate::error::{Error, Result};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    ItemsAndPagesNumber, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

/// One page of films
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page_number: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Duration aggregates over all films; `None` when there are no films
#[derive(Clone, Debug, PartialEq)]
pub struct FilmStatistics {
    pub count: i64,
    pub average_duration: Option<f64>,
    pub longest: Option<i32>,
    pub shortest: Option<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilmSummary {
    pub title: String,
    pub released_year: i32,
    pub hours: f64,
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    title: String,
    released_year: i32,
    duration: i32,
}

impl From<SummaryRow> for FilmSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            title: row.title,
            released_year: row.released_year,
            hours: f64::from(row.duration) / 60.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectedFilm {
    pub title: String,
    /// "Lastname Firstname", or "Unknown"
    pub director: String,
}

#[derive(Debug)]
pub struct FilmQueries<'a, C = DatabaseConnection> {
    context: &'a DataContext<C>,
}

impl<'a, C> FilmQueries<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(context: &'a DataContext<C>) -> Self {
        Self { context }
    }

    fn db(&self) -> &'a C {
        self.context.connection()
    }

    pub async fn longer_than(&self, minutes: i32) -> Result<Vec<film::Model>> {
        Ok(film::Entity::find()
            .filter(film::Column::Duration.gt(minutes))
            .order_by_asc(film::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn released_after_and_longer_than(
        &self,
        year: i32,
        minutes: i32,
    ) -> Result<Vec<film::Model>> {
        Ok(film::Entity::find()
            .filter(
                Condition::all()
                    .add(film::Column::ReleasedYear.gt(year))
                    .add(film::Column::Duration.gt(minutes)),
            )
            .order_by_asc(film::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn title_contains(&self, text: &str) -> Result<Vec<film::Model>> {
        Ok(film::Entity::find()
            .filter(film::Column::Title.contains(text))
            .order_by_asc(film::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn by_title(&self, limit: u64) -> Result<Vec<film::Model>> {
        Ok(film::Entity::find()
            .order_by_asc(film::Column::Title)
            .limit(limit)
            .all(self.db())
            .await?)
    }

    pub async fn by_year_desc(&self, limit: u64) -> Result<Vec<film::Model>> {
        Ok(film::Entity::find()
            .order_by_desc(film::Column::ReleasedYear)
            .limit(limit)
            .all(self.db())
            .await?)
    }

    pub async fn by_year_desc_then_title(&self, limit: u64) -> Result<Vec<film::Model>> {
        Ok(film::Entity::find()
            .order_by_desc(film::Column::ReleasedYear)
            .order_by_asc(film::Column::Title)
            .limit(limit)
            .all(self.db())
            .await?)
    }

    /// Films ordered by title, `page_number` counting from 1.
    pub async fn page(&self, page_number: u64, page_size: u64) -> Result<Page<film::Model>> {
        if page_number == 0 || page_size == 0 {
            return Err(Error::Validation(format!(
                "page {page_number} of size {page_size}: both must be at least 1"
            )));
        }
        let paginator = film::Entity::find()
            .order_by_asc(film::Column::Title)
            .order_by_asc(film::Column::Id)
            .paginate(self.db(), page_size);
        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page_number - 1).await?;
        Ok(Page {
            items,
            page_number,
            page_size,
            total_items: number_of_items,
            total_pages: number_of_pages,
        })
    }

    pub async fn statistics(&self) -> Result<FilmStatistics> {
        let duration = || Expr::col(film::Column::Duration);
        let row = film::Entity::find()
            .select_only()
            .column_as(SimpleExpr::from(Func::count(Expr::col(film::Column::Id))), "count")
            .column_as(SimpleExpr::from(Func::avg(duration())), "average")
            .column_as(SimpleExpr::from(Func::max(duration())), "longest")
            .column_as(SimpleExpr::from(Func::min(duration())), "shortest")
            .into_tuple::<(i64, Option<f64>, Option<i32>, Option<i32>)>()
            .one(self.db())
            .await?;
        let (count, average_duration, longest, shortest) = row.unwrap_or((0, None, None, None));
        Ok(FilmStatistics {
            count,
            average_duration,
            longest,
            shortest,
        })
    }

    pub async fn any_longer_than(&self, minutes: i32) -> Result<bool> {
        let count = film::Entity::find()
            .filter(film::Column::Duration.gt(minutes))
            .count(self.db())
            .await?;
        Ok(count > 0)
    }

    pub async fn titles(&self, limit: u64) -> Result<Vec<String>> {
        Ok(film::Entity::find()
            .select_only()
            .column(film::Column::Title)
            .order_by_asc(film::Column::Title)
            .limit(limit)
            .into_tuple::<String>()
            .all(self.db())
            .await?)
    }

    pub async fn summaries(&self, limit: u64) -> Result<Vec<FilmSummary>> {
        let rows = film::Entity::find()
            .select_only()
            .columns([
                film::Column::Title,
                film::Column::ReleasedYear,
                film::Column::Duration,
            ])
            .order_by_asc(film::Column::Id)
            .limit(limit)
            .into_model::<SummaryRow>()
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(FilmSummary::from).collect())
    }

    pub async fn directed_by(&self, limit: u64) -> Result<Vec<DirectedFilm>> {
        let rows = film::Entity::find()
            .find_also_related(creator::Entity)
            .order_by_asc(film::Column::Id)
            .limit(limit)
            .all(self.db())
            .await?;
        Ok(rows
            .into_iter()
            .map(|(film, creator)| DirectedFilm {
                title: film.title,
                director: creator.map_or_else(|| "Unknown".to_owned(), |c| c.full_name()),
            })
            .collect())
    }

    pub async fn creators_with_films(&self) -> Result<Vec<(creator::Model, Vec<film::Model>)>> {
        Ok(creator::Entity::find()
            .order_by_asc(creator::Column::Id)
            .find_with_related(film::Entity)
            .all(self.db())
            .await?)
    }

    pub async fn actors_with_films(&self) -> Result<Vec<(actor::Model, Vec<film::Model>)>> {
        Ok(actor::Entity::find()
            .order_by_asc(actor::Column::Id)
            .find_with_related(film::Entity)
            .all(self.db())
            .await?)
    }

    /// SQL of "films longer than `minutes` with their creator, longest
    /// first".
    pub fn long_films_with_creator_sql(&self, minutes: i32) -> String {
        let query = film::Entity::find()
            .find_also_related(creator::Entity)
            .filter(film::Column::Duration.gt(minutes))
            .order_by_desc(film::Column::Duration);
        self.context.to_query_string(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_converts_minutes_to_hours() {
        let summary = FilmSummary::from(SummaryRow {
            title: "Avatar 2".to_owned(),
            released_year: 2022,
            duration: 192,
        });
        assert_eq!(summary.hours, 3.2);
        assert_eq!(summary.released_year, 2022);
    }
}
