use super::m20260118_000001_create_catalog_tables::{Actors, Creators, Films};
use super::m20260118_000002_create_film_actors_table::FilmActors;
use sea_orm_migration::prelude::*;

const ACTORS: [(i32, &str, &str); 3] = [
    (1, "Worthington", "Sam"),
    (2, "Saldaña", "Zoe"),
    (3, "Weaver", "Sigourney"),
];

const CREATORS: [(i32, &str, &str); 1] = [(1, "Cameron", "James")];

/// (id, title, released year, duration, creator id)
const FILMS: [(i32, &str, i32, i32, i32); 3] = [
    (1, "Avatar", 2009, 162, 1),
    (2, "Avatar 2", 2022, 192, 1),
    (3, "Avatar 3", 2025, 210, 1),
];

/// (actor id, film id, character firstname, character lastname)
const CAST: [(i32, i32, &str, Option<&str>); 7] = [
    (1, 1, "Jake", Some("Sulley")),
    (1, 2, "Jake", Some("Sulley")),
    (1, 3, "Jake", Some("Sulley")),
    (2, 1, "Neytiri", None),
    (2, 2, "Neytiri", None),
    (2, 3, "Neytiri", None),
    (3, 1, "Grace", Some("Augustine")),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut actors = Query::insert()
            .into_table(Actors::Table)
            .columns([Actors::Id, Actors::Lastname, Actors::Firstname])
            .to_owned();
        for (id, lastname, firstname) in ACTORS {
            actors
                .values([id.into(), lastname.into(), firstname.into()])
                .map_err(seed_err)?;
        }
        manager.exec_stmt(actors).await?;

        let mut creators = Query::insert()
            .into_table(Creators::Table)
            .columns([Creators::Id, Creators::Lastname, Creators::Firstname])
            .to_owned();
        for (id, lastname, firstname) in CREATORS {
            creators
                .values([id.into(), lastname.into(), firstname.into()])
                .map_err(seed_err)?;
        }
        manager.exec_stmt(creators).await?;

        let mut films = Query::insert()
            .into_table(Films::Table)
            .columns([
                Films::Id,
                Films::Title,
                Films::ReleasedYear,
                Films::Duration,
                Films::CreatorId,
            ])
            .to_owned();
        for (id, title, released_year, duration, creator_id) in FILMS {
            films
                .values([
                    id.into(),
                    title.into(),
                    released_year.into(),
                    duration.into(),
                    creator_id.into(),
                ])
                .map_err(seed_err)?;
        }
        manager.exec_stmt(films).await?;

        let mut cast = Query::insert()
            .into_table(FilmActors::Table)
            .columns([
                FilmActors::ActorId,
                FilmActors::FilmId,
                FilmActors::CharacterFirstname,
                FilmActors::CharacterLastname,
            ])
            .to_owned();
        for (actor_id, film_id, firstname, lastname) in CAST {
            cast.values([
                actor_id.into(),
                film_id.into(),
                firstname.into(),
                lastname.map(str::to_owned).into(),
            ])
            .map_err(seed_err)?;
        }
        manager.exec_stmt(cast).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(FilmActors::Table).to_owned())
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Films::Table)
                    .and_where(Expr::col(Films::Id).is_in(FILMS.map(|film| film.0)))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Creators::Table)
                    .and_where(Expr::col(Creators::Id).is_in(CREATORS.map(|creator| creator.0)))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Actors::Table)
                    .and_where(Expr::col(Actors::Id).is_in(ACTORS.map(|actor| actor.0)))
                    .to_owned(),
            )
            .await
    }
}

fn seed_err(err: sea_query::error::Error) -> DbErr {
    DbErr::Migration(format!("invalid seed row: {err}"))
}
