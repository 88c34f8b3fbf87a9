use super::{EntityRepository, Repository};
use crate::context::DataContext;
use crate::entity::{actor, creator, film, film_actor};
use crate::error::{Error, Result};
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::instrument;

/// A film with its creator and cast loaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilmDetails {
    pub film: film::Model,
    pub creator: creator::Model,
    pub actors: Vec<actor::Model>,
}

/// An actor together with the character played in one film
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub actor: actor::Model,
    pub character: film_actor::Model,
}

/// Films, always read with creator and actors.
#[derive(Debug)]
pub struct FilmRepository<'a, C = DatabaseConnection> {
    films: EntityRepository<'a, film::ActiveModel, C>,
}

impl<'a, C> FilmRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(context: &'a DataContext<C>) -> Self {
        Self {
            films: EntityRepository::new(context),
        }
    }

    pub fn context(&self) -> &'a DataContext<C> {
        self.films.context()
    }

    /// Films released in `year`, in the store's order.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_by_released_year(&self, year: i32) -> Result<Vec<FilmDetails>> {
        let films = film::Entity::find()
            .filter(film::Column::ReleasedYear.eq(year))
            .all(self.context().connection())
            .await?;
        self.with_details(films).await
    }

    /// The cast of one film, by actor id.
    pub async fn get_cast(&self, film_id: i32) -> Result<Vec<Role>> {
        let rows = film_actor::Entity::find()
            .filter(film_actor::Column::FilmId.eq(film_id))
            .order_by_asc(film_actor::Column::ActorId)
            .find_also_related(actor::Entity)
            .all(self.context().connection())
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(character, actor)| actor.map(|actor| Role { actor, character }))
            .collect())
    }

    async fn with_details(&self, films: Vec<film::Model>) -> Result<Vec<FilmDetails>> {
        let db = self.context().connection();
        let creators = films.load_one(creator::Entity, db).await?;
        let actors = films
            .load_many_to_many(actor::Entity, film_actor::Entity, db)
            .await?;

        films
            .into_iter()
            .zip(creators)
            .zip(actors)
            .map(|((film, creator), actors)| {
                let creator = creator.ok_or_else(|| {
                    Error::not_found("creators", format!("{}", film.creator_id))
                })?;
                Ok(FilmDetails {
                    film,
                    creator,
                    actors,
                })
            })
            .collect()
    }
}

#[async_trait]
impl<C> Repository<film::Model, i32> for FilmRepository<'_, C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    type Item = FilmDetails;

    async fn add(&self, entity: film::Model) -> Result<()> {
        self.films.add(entity).await
    }

    async fn get_all(&self) -> Result<Vec<FilmDetails>> {
        let films = self.films.get_all().await?;
        self.with_details(films).await
    }

    async fn get_by_id(&self, key: i32) -> Result<Option<FilmDetails>> {
        let Some(film) = self.films.get_by_id(key).await? else {
            return Ok(None);
        };
        Ok(self.with_details(vec![film]).await?.pop())
    }

    async fn update(&self, key: i32, entity: film::Model) -> Result<()> {
        self.films.update(key, entity).await
    }

    async fn delete(&self, key: i32) -> Result<()> {
        self.films.delete(key).await
    }
}
