use crate::context::DataContext;
use crate::entity::film;
use crate::error::{Error, Result};
use crate::repository::{FilmDetails, FilmRepository, Repository, Role};
use migration::MIN_RELEASED_YEAR;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::warn;

/// Business rules in front of [`FilmRepository`].
#[derive(Debug)]
pub struct FilmService<'a, C = DatabaseConnection> {
    films: FilmRepository<'a, C>,
}

impl<'a, C> FilmService<'a, C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(context: &'a DataContext<C>) -> Self {
        Self::with_repository(FilmRepository::new(context))
    }

    pub fn with_repository(films: FilmRepository<'a, C>) -> Self {
        Self { films }
    }

    pub fn repository(&self) -> &FilmRepository<'a, C> {
        &self.films
    }

    /// Films released in `year`. Years before 1950 are rejected without
    /// querying the store.
    pub async fn get_all_film_by_released_year(&self, year: i32) -> Result<Vec<FilmDetails>> {
        if year < MIN_RELEASED_YEAR {
            warn!(year, "released year below {MIN_RELEASED_YEAR}");
            return Err(Error::Validation(format!(
                "released year {year} is before {MIN_RELEASED_YEAR}"
            )));
        }
        self.films.get_by_released_year(year).await
    }

    pub async fn get_all_films(&self) -> Result<Vec<FilmDetails>> {
        self.films.get_all().await
    }

    pub async fn get_film(&self, id: i32) -> Result<Option<FilmDetails>> {
        self.films.get_by_id(id).await
    }

    pub async fn add_film(&self, film: film::Model) -> Result<()> {
        self.films.add(film).await
    }

    pub async fn update_film(&self, id: i32, film: film::Model) -> Result<()> {
        self.films.update(id, film).await
    }

    pub async fn delete_film(&self, id: i32) -> Result<()> {
        self.films.delete(id).await
    }

    pub async fn get_cast(&self, film_id: i32) -> Result<Vec<Role>> {
        self.films.get_cast(film_id).await
    }
}
