//! Repositories over the persistence context.
//!
//! A repository borrows a [`DataContext`](crate::context::DataContext):
//! reads hit the connection, writes are staged and only reach the store on
//! `save_changes`.

mod film;
mod generic;

pub use film::{FilmDetails, FilmRepository, Role};
pub use generic::{EntityRepository, ModelOf, PrimaryKeyOf};

use crate::error::Result;
use async_trait::async_trait;

/// CRUD over one entity type `T` identified by a key `K`
#[async_trait]
pub trait Repository<T, K>: Send + Sync
where
    T: Send + 'static,
    K: Send + 'static,
{
    /// What reads return; specialised repositories may attach related rows
    type Item: Send;

    /// Stages `entity` for insertion.
    async fn add(&self, entity: T) -> Result<()>;

    async fn get_all(&self) -> Result<Vec<Self::Item>>;

    async fn get_by_id(&self, key: K) -> Result<Option<Self::Item>>;

    /// Copies every non-key column of `entity` onto the stored row and
    /// stages the update. Fails with `NotFound` when no row has `key`.
    async fn update(&self, key: K, entity: T) -> Result<()>;

    /// Stages the removal of the row with `key`; `NotFound` when absent.
    async fn delete(&self, key: K) -> Result<()>;
}
