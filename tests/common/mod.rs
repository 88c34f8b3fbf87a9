#![allow(dead_code)]

use film_catalog::DataContext;
use film_catalog::entity::{actor, film};
use sea_orm::{EntityTrait, PaginatorTrait};

/// A migrated and seeded in-memory catalog.
pub struct TestContext {
    pub db: DataContext,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = DataContext::connect_url("sqlite::memory:").await.unwrap();
        Self { db }
    }

    pub async fn film_count(&self) -> u64 {
        film::Entity::find()
            .count(self.db.connection())
            .await
            .unwrap()
    }

    pub async fn actor_count(&self) -> u64 {
        actor::Entity::find()
            .count(self.db.connection())
            .await
            .unwrap()
    }
}

pub fn new_film(title: &str, released_year: i32, duration: i32) -> film::Model {
    film::Model {
        id: 0,
        title: title.to_owned(),
        released_year,
        duration,
        creator_id: 1,
    }
}
