//! The persistence context: one connection or transaction, typed entity
//! collections and a unit of work flushed by [`DataContext::save_changes`].

mod set;
mod tracker;

pub use set::EntitySet;
pub use tracker::{ChangeTracker, EntityState, TrackedEntry};

use crate::config::DatabaseConfig;
use crate::entity::{actor, creator, film, film_actor};
use crate::error::{Error, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, IntoActiveModel, QueryTrait, Statement,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

/// Applied and pending migrations of a database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

#[derive(Debug)]
pub struct DataContext<C = DatabaseConnection> {
    conn: C,
    tracker: ChangeTracker,
}

impl DataContext<DatabaseConnection> {
    /// Connects and, unless disabled, brings the schema up to date.
    #[instrument(skip_all)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let conn = Database::connect(config.connect_options()).await?;
        let context = Self::from_connection(conn);
        if config.migrate {
            context.ensure_schema().await?;
        }
        Ok(context)
    }

    pub async fn connect_url(database_url: &str) -> Result<Self> {
        Self::connect(&DatabaseConfig::new(database_url)).await
    }

    /// Applies pending migrations, if any.
    pub async fn ensure_schema(&self) -> Result<()> {
        let pending = Migrator::get_pending_migrations(&self.conn).await?;
        if pending.is_empty() {
            debug!("schema is up to date");
            return Ok(());
        }
        info!(count = pending.len(), "applying pending migrations");
        Migrator::up(&self.conn, None).await?;
        Ok(())
    }

    pub async fn migration_status(&self) -> Result<MigrationReport> {
        let applied = Migrator::get_applied_migrations(&self.conn).await?;
        let pending = Migrator::get_pending_migrations(&self.conn).await?;
        Ok(MigrationReport {
            applied: applied.iter().map(|m| m.name().to_owned()).collect(),
            pending: pending.iter().map(|m| m.name().to_owned()).collect(),
        })
    }

    pub fn into_connection(self) -> DatabaseConnection {
        self.conn
    }
}

impl DataContext<DatabaseTransaction> {
    /// Commits the transaction. Changes still staged are discarded.
    pub async fn commit(self) -> Result<()> {
        let DataContext { conn, tracker } = self;
        if tracker.has_changes() {
            warn!("committing with unsaved changes; they are discarded");
        }
        conn.commit().await?;
        debug!("transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.conn.rollback().await?;
        debug!("transaction rolled back");
        Ok(())
    }
}

impl<C> DataContext<C> {
    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }
}

impl<C> DataContext<C>
where
    C: ConnectionTrait + TransactionTrait,
{
    /// Wraps an open connection without touching the schema.
    pub fn from_connection(conn: C) -> Self {
        Self {
            conn,
            tracker: ChangeTracker::default(),
        }
    }

    pub fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    pub fn set<A>(&self) -> EntitySet<'_, A, C>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        EntitySet::new(self)
    }

    pub fn actors(&self) -> EntitySet<'_, actor::ActiveModel, C> {
        self.set()
    }

    pub fn creators(&self) -> EntitySet<'_, creator::ActiveModel, C> {
        self.set()
    }

    pub fn films(&self) -> EntitySet<'_, film::ActiveModel, C> {
        self.set()
    }

    pub fn film_actors(&self) -> EntitySet<'_, film_actor::ActiveModel, C> {
        self.set()
    }

    /// Writes every staged change, in staging order, inside one transaction
    /// and returns the number of affected rows.
    ///
    /// Saved rows stay tracked as Unchanged with their stored values,
    /// generated keys included; deleted rows are forgotten. On failure
    /// nothing of the batch is kept and its staged changes are dropped.
    #[instrument(level = "debug", skip(self))]
    pub async fn save_changes(&self) -> Result<u64> {
        let (pending, unchanged): (Vec<_>, Vec<_>) = self
            .tracker
            .take()
            .into_iter()
            .partition(|change| change.entry().state.is_pending());
        self.tracker.restore(unchanged);
        if pending.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;
        let mut affected = 0;
        let mut settled = Vec::with_capacity(pending.len());
        for change in pending {
            let entry = change.entry().clone();
            match change.apply(&txn).await {
                Ok(applied) => {
                    affected += applied.rows;
                    settled.push((entry, applied.saved));
                }
                Err(err) => {
                    warn!(
                        entity = %entry.entity,
                        key = %entry.key,
                        state = %entry.state,
                        %err,
                        "save failed, rolling back"
                    );
                    if let Err(rollback) = txn.rollback().await {
                        warn!(%rollback, "rollback failed");
                    }
                    return Err(match err {
                        DbErr::RecordNotUpdated if entry.state == EntityState::Modified => {
                            Error::not_found(entry.entity, entry.key)
                        }
                        err => Error::from(err),
                    });
                }
            }
        }
        txn.commit().await?;

        for (entry, saved) in settled {
            self.tracker.settle(&entry, saved);
        }
        info!(affected, "changes saved");
        Ok(affected)
    }

    /// Opens a transaction; the returned context stages and saves inside it.
    pub async fn begin(&self) -> Result<DataContext<DatabaseTransaction>> {
        let txn = self.conn.begin().await?;
        debug!("transaction started");
        Ok(DataContext::from_connection(txn))
    }

    pub async fn can_connect(&self) -> bool {
        let stmt = Statement::from_string(self.backend(), "SELECT 1");
        match self.conn.query_one(stmt).await {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "database is not reachable");
                false
            }
        }
    }

    /// The SQL the query would run, with its values inlined.
    pub fn to_query_string<Q: QueryTrait>(&self, query: &Q) -> String {
        query.build(self.backend()).to_string()
    }
}
