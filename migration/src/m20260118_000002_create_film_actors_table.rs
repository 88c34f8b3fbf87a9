use super::m20260118_000001_create_catalog_tables::{Actors, Films};
use sea_orm_migration::sea_orm::DbBackend;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FilmActors::Table)
                    .if_not_exists()
                    .col(integer(FilmActors::ActorId))
                    .col(integer(FilmActors::FilmId))
                    .col(string_len_null(FilmActors::CharacterLastname, 50))
                    .col(string_len(FilmActors::CharacterFirstname, 50))
                    .primary_key(
                        Index::create()
                            .name("pk-film_actors")
                            .col(FilmActors::ActorId)
                            .col(FilmActors::FilmId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-film_actors-actor_id")
                            .from(FilmActors::Table, FilmActors::ActorId)
                            .to(Actors::Table, Actors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-film_actors-film_id")
                            .from(FilmActors::Table, FilmActors::FilmId)
                            .to(Films::Table, Films::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Sqlite {
            for name in ["fk-film_actors-actor_id", "fk-film_actors-film_id"] {
                manager
                    .drop_foreign_key(
                        ForeignKey::drop()
                            .table(FilmActors::Table)
                            .name(name)
                            .to_owned(),
                    )
                    .await?;
            }
        }
        manager
            .drop_table(Table::drop().table(FilmActors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum FilmActors {
    Table,
    ActorId,
    FilmId,
    CharacterLastname,
    CharacterFirstname,
}
