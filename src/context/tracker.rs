//! Change tracking for [`super::DataContext`].
//!
//! SeaORM executes every write immediately, so the context keeps its own
//! buffer of staged active models and replays it on `save_changes`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseTransaction, DbErr, EntityName, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable, PrimaryKeyToColumn, Value,
};
use std::any::Any;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Where a tracked model stands relative to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Not tracked by the context
    Detached,
    /// Tracked, no pending write
    Unchanged,
    /// Will be inserted on the next save
    Added,
    /// Will be updated on the next save
    Modified,
    /// Will be deleted on the next save
    Deleted,
}

impl EntityState {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Added | Self::Modified | Self::Deleted)
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Detached => "Detached",
            Self::Unchanged => "Unchanged",
            Self::Added => "Added",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
        };
        f.write_str(state)
    }
}

/// A snapshot of one tracked model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntry {
    pub entity: String,
    pub key: String,
    pub state: EntityState,
}

#[async_trait]
pub(crate) trait PendingChange: Send + Sync {
    fn entry(&self) -> &TrackedEntry;

    fn model(&self) -> &(dyn Any + Send + Sync);

    async fn apply(self: Box<Self>, txn: &DatabaseTransaction) -> Result<Applied, DbErr>;
}

/// Outcome of one applied change
pub(crate) struct Applied {
    pub(crate) rows: u64,
    /// The row as stored, tracked as Unchanged; `None` once deleted
    pub(crate) saved: Option<Box<dyn PendingChange>>,
}

struct Staged<A> {
    entry: TrackedEntry,
    model: A,
}

impl<A> Staged<A>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    fn new(model: A, state: EntityState) -> Self {
        let entry = TrackedEntry {
            entity: table_name::<A>(),
            key: key_of(&model),
            state,
        };
        Self { entry, model }
    }

    fn stored(model: <A::Entity as EntityTrait>::Model) -> Box<dyn PendingChange> {
        Box::new(Self::new(model.into_active_model(), EntityState::Unchanged))
    }
}

#[async_trait]
impl<A> PendingChange for Staged<A>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    fn entry(&self) -> &TrackedEntry {
        &self.entry
    }

    fn model(&self) -> &(dyn Any + Send + Sync) {
        &self.model
    }

    async fn apply(self: Box<Self>, txn: &DatabaseTransaction) -> Result<Applied, DbErr> {
        match self.entry.state {
            EntityState::Added => {
                let stored = self.model.insert(txn).await?;
                Ok(Applied {
                    rows: 1,
                    saved: Some(Self::stored(stored)),
                })
            }
            EntityState::Modified => {
                let stored = self.model.update(txn).await?;
                Ok(Applied {
                    rows: 1,
                    saved: Some(Self::stored(stored)),
                })
            }
            EntityState::Deleted => {
                let res = self.model.delete(txn).await?;
                Ok(Applied {
                    rows: res.rows_affected,
                    saved: None,
                })
            }
            EntityState::Unchanged | EntityState::Detached => Ok(Applied {
                rows: 0,
                saved: Some(self),
            }),
        }
    }
}

/// Staged models in the order they were staged
#[derive(Default)]
pub struct ChangeTracker {
    changes: Mutex<Vec<Box<dyn PendingChange>>>,
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("entries", &self.entries())
            .finish()
    }
}

impl ChangeTracker {
    pub(crate) fn track<A>(&self, model: A, state: EntityState)
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let staged = Staged::new(model, state);
        debug!(entity = %staged.entry.entity, key = %staged.entry.key, %state, "tracking");
        self.lock().push(Box::new(staged));
    }

    /// Tracked models of type `A`, in tracking order.
    pub fn models<A: ActiveModelTrait + 'static>(&self) -> Vec<A> {
        self.lock()
            .iter()
            .filter_map(|change| change.model().downcast_ref::<A>().cloned())
            .collect()
    }

    pub fn entries(&self) -> Vec<TrackedEntry> {
        self.lock()
            .iter()
            .map(|change| change.entry().clone())
            .collect()
    }

    /// State of the most recent entry for this model's table and key.
    pub fn state_of<A: ActiveModelTrait>(&self, model: &A) -> EntityState {
        let (entity, key) = (table_name::<A>(), key_of(model));
        self.lock()
            .iter()
            .rev()
            .map(|change| change.entry())
            .find(|entry| entry.entity == entity && entry.key == key)
            .map_or(EntityState::Detached, |entry| entry.state)
    }

    pub fn has_changes(&self) -> bool {
        self.lock()
            .iter()
            .any(|change| change.entry().state.is_pending())
    }

    /// Stops tracking the model, dropping any write staged for it.
    pub fn detach<A: ActiveModelTrait>(&self, model: &A) -> bool {
        let (entity, key) = (table_name::<A>(), key_of(model));
        let mut changes = self.lock();
        let before = changes.len();
        changes.retain(|change| {
            let entry = change.entry();
            entry.entity != entity || entry.key != key
        });
        before != changes.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub(crate) fn take(&self) -> Vec<Box<dyn PendingChange>> {
        std::mem::take(&mut *self.lock())
    }

    /// Puts entries back ahead of anything tracked since they were taken.
    pub(crate) fn restore(&self, changes: Vec<Box<dyn PendingChange>>) {
        let mut tracked = self.lock();
        let newer = std::mem::replace(&mut *tracked, changes);
        tracked.extend(newer);
    }

    /// Replaces every entry for the row of a saved change with the row as
    /// stored, or forgets the row when it was deleted.
    pub(crate) fn settle(&self, staged: &TrackedEntry, saved: Option<Box<dyn PendingChange>>) {
        let mut tracked = self.lock();
        tracked.retain(|change| {
            let entry = change.entry();
            !same_row(entry, staged)
                && saved
                    .as_ref()
                    .is_none_or(|saved| !same_row(entry, saved.entry()))
        });
        tracked.extend(saved);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Box<dyn PendingChange>>> {
        self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn same_row(a: &TrackedEntry, b: &TrackedEntry) -> bool {
    a.entity == b.entity && a.key == b.key
}

pub(crate) fn table_name<A: ActiveModelTrait>() -> String {
    A::Entity::default().table_name().to_owned()
}

/// Renders the primary key of an active model as `column=value` pairs.
pub(crate) fn key_of<A: ActiveModelTrait>(model: &A) -> String {
    <<A::Entity as EntityTrait>::PrimaryKey as Iterable>::iter()
        .map(|key| {
            let column = key.into_column();
            let value = model
                .get(column)
                .into_value()
                .map_or_else(|| "?".to_owned(), |value| render_value(&value));
            format!("{}={}", column.as_str(), value)
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Int(Some(v)) => v.to_string(),
        Value::BigInt(Some(v)) => v.to_string(),
        Value::String(Some(v)) => v.to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{film, film_actor};
    use sea_orm::Set;

    fn avatar() -> film::ActiveModel {
        film::ActiveModel {
            id: Set(1),
            title: Set("Avatar".to_owned()),
            released_year: Set(2009),
            duration: Set(162),
            creator_id: Set(1),
        }
    }

    #[test]
    fn keys_render_every_primary_key_column() {
        assert_eq!(key_of(&avatar()), "id=1");

        let role = film_actor::ActiveModel {
            actor_id: Set(3),
            film_id: Set(1),
            ..Default::default()
        };
        assert_eq!(key_of(&role), "actor_id=3,film_id=1");
        assert_eq!(key_of(&<film::ActiveModel as Default>::default()), "id=?");
    }

    #[test]
    fn state_follows_the_latest_entry() {
        let tracker = ChangeTracker::default();
        assert_eq!(tracker.state_of(&avatar()), EntityState::Detached);

        tracker.track(avatar(), EntityState::Unchanged);
        assert_eq!(tracker.state_of(&avatar()), EntityState::Unchanged);
        assert!(!tracker.has_changes());

        tracker.track(avatar(), EntityState::Modified);
        assert_eq!(tracker.state_of(&avatar()), EntityState::Modified);
        assert!(tracker.has_changes());

        assert!(tracker.detach(&avatar()));
        assert_eq!(tracker.state_of(&avatar()), EntityState::Detached);
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn take_drains_in_staging_order() {
        let tracker = ChangeTracker::default();
        tracker.track(avatar(), EntityState::Added);
        tracker.track(avatar(), EntityState::Deleted);

        let states: Vec<_> = tracker
            .take()
            .iter()
            .map(|change| change.entry().state)
            .collect();
        assert_eq!(states, [EntityState::Added, EntityState::Deleted]);
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn settling_replaces_the_row_entries() {
        let tracker = ChangeTracker::default();
        tracker.track(avatar(), EntityState::Unchanged);
        tracker.track(avatar(), EntityState::Modified);
        let staged = tracker.entries()[1].clone();

        let mut longer = avatar();
        longer.duration = Set(171);
        let saved: Box<dyn PendingChange> =
            Box::new(Staged::new(longer.clone(), EntityState::Unchanged));
        tracker.settle(&staged, Some(saved));

        assert_eq!(tracker.entries().len(), 1);
        assert_eq!(tracker.state_of(&avatar()), EntityState::Unchanged);
        assert_eq!(tracker.models::<film::ActiveModel>(), [longer]);

        tracker.settle(&staged, None);
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn restored_entries_come_first() {
        let tracker = ChangeTracker::default();
        tracker.track(avatar(), EntityState::Unchanged);
        let taken = tracker.take();
        tracker.track(avatar(), EntityState::Modified);
        tracker.restore(taken);

        let states: Vec<_> = tracker.entries().into_iter().map(|e| e.state).collect();
        assert_eq!(states, [EntityState::Unchanged, EntityState::Modified]);
    }
}
