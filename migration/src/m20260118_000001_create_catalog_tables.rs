use sea_orm_migration::sea_orm::DbBackend;
use sea_orm_migration::{prelude::*, schema::*};

/// Films released before this year are rejected by the `films` check constraint.
pub const MIN_RELEASED_YEAR: i32 = 1950;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(pk_auto(Actors::Id))
                    .col(string_len(Actors::Lastname, 50))
                    .col(string_len(Actors::Firstname, 50))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Creators::Table)
                    .if_not_exists()
                    .col(pk_auto(Creators::Id))
                    .col(string_len(Creators::Lastname, 50))
                    .col(string_len(Creators::Firstname, 50))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Films::Table)
                    .if_not_exists()
                    .col(pk_auto(Films::Id))
                    .col(string_len(Films::Title, 100))
                    .col(integer(Films::ReleasedYear))
                    .col(integer(Films::Duration))
                    .col(integer(Films::CreatorId))
                    .check(Expr::col(Films::ReleasedYear).gte(MIN_RELEASED_YEAR))
                    .check(Expr::col(Films::Duration).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-films-creator_id")
                            .from(Films::Table, Films::CreatorId)
                            .to(Creators::Table, Creators::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-films-released_year")
                    .table(Films::Table)
                    .col(Films::ReleasedYear)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Sqlite {
            manager
                .drop_foreign_key(
                    ForeignKey::drop()
                        .table(Films::Table)
                        .name("fk-films-creator_id")
                        .to_owned(),
                )
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Films::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Creators::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Actors {
    Table,
    Id,
    Lastname,
    Firstname,
}

#[derive(DeriveIden)]
pub enum Creators {
    Table,
    Id,
    Lastname,
    Firstname,
}

#[derive(DeriveIden)]
pub enum Films {
    Table,
    Id,
    Title,
    ReleasedYear,
    Duration,
    CreatorId,
}
