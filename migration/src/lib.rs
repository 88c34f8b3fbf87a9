pub use sea_orm_migration::prelude::*;

mod m20260118_000001_create_catalog_tables;
mod m20260118_000002_create_film_actors_table;
mod m20260118_000003_seed_catalog;

pub use m20260118_000001_create_catalog_tables::MIN_RELEASED_YEAR;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260118_000001_create_catalog_tables::Migration),
            Box::new(m20260118_000002_create_film_actors_table::Migration),
            Box::new(m20260118_000003_seed_catalog::Migration),
        ]
    }
}
