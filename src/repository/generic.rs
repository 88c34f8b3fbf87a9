use super::Repository;
use crate::context::{DataContext, EntitySet};
use crate::error::{Error, Result};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable, ModelTrait, PrimaryKeyToColumn, PrimaryKeyTrait,
    TransactionTrait, Value,
};
use std::fmt::Debug;
use tracing::{debug, instrument};

pub type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

pub type PrimaryKeyOf<A> =
    <<<A as ActiveModelTrait>::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// A [`Repository`] for any entity, addressed through its active model `A`.
pub struct EntityRepository<'a, A, C = DatabaseConnection> {
    set: EntitySet<'a, A, C>,
}

impl<A: ActiveModelTrait, C> Debug for EntityRepository<'_, A, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRepository")
            .field("table", &self.set.table_name())
            .finish()
    }
}

impl<'a, A, C> EntityRepository<'a, A, C>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    ModelOf<A>: IntoActiveModel<A>,
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(context: &'a DataContext<C>) -> Self {
        Self {
            set: context.set(),
        }
    }

    pub fn context(&self) -> &'a DataContext<C> {
        self.set.context()
    }

    async fn find_existing(&self, key: PrimaryKeyOf<A>) -> Result<ModelOf<A>>
    where
        PrimaryKeyOf<A>: Clone,
    {
        A::Entity::find_by_id(key.clone())
            .one(self.context().connection())
            .await?
            .ok_or_else(|| Error::not_found(self.set.table_name(), format!("{key:?}")))
    }
}

fn key_column_names<A: ActiveModelTrait>() -> Vec<String> {
    <<A::Entity as EntityTrait>::PrimaryKey as Iterable>::iter()
        .map(|key| key.into_column().as_str().to_owned())
        .collect()
}

fn is_key(keys: &[String], column: &impl IdenStatic) -> bool {
    keys.iter().any(|key| key == column.as_str())
}

/// Builds an insertable active model. A zero in an auto-increment key is
/// left unset so the store generates it.
fn insertable<A>(model: &ModelOf<A>) -> A
where
    A: ActiveModelTrait + ActiveModelBehavior,
{
    let keys = key_column_names::<A>();
    let generated = <<A::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::auto_increment();
    let mut active = A::new();
    for column in <<A::Entity as EntityTrait>::Column as Iterable>::iter() {
        let value = model.get(column);
        if generated && is_key(&keys, &column) && is_zero(&value) {
            continue;
        }
        active.set(column, value);
    }
    active
}

fn is_zero(value: &Value) -> bool {
    matches!(
        value,
        Value::Int(Some(0))
            | Value::BigInt(Some(0))
            | Value::SmallInt(Some(0))
            | Value::Unsigned(Some(0))
            | Value::BigUnsigned(Some(0))
    )
}

#[async_trait]
impl<'a, A, C> Repository<ModelOf<A>, PrimaryKeyOf<A>> for EntityRepository<'a, A, C>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    ModelOf<A>: IntoActiveModel<A> + Send + Sync + 'static,
    PrimaryKeyOf<A>: Clone + Send + Sync + 'static,
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    type Item = ModelOf<A>;

    async fn add(&self, entity: ModelOf<A>) -> Result<()> {
        self.set.add(insertable::<A>(&entity));
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<ModelOf<A>>> {
        Ok(self.set.find().all(self.context().connection()).await?)
    }

    async fn get_by_id(&self, key: PrimaryKeyOf<A>) -> Result<Option<ModelOf<A>>> {
        Ok(self
            .set
            .find_by_id(key)
            .one(self.context().connection())
            .await?)
    }

    #[instrument(level = "debug", skip_all, fields(?key))]
    async fn update(&self, key: PrimaryKeyOf<A>, entity: ModelOf<A>) -> Result<()> {
        let mut active = self.find_existing(key).await?.into_active_model();
        let keys = key_column_names::<A>();
        for column in <<A::Entity as EntityTrait>::Column as Iterable>::iter() {
            if !is_key(&keys, &column) {
                active.set(column, entity.get(column));
            }
        }
        debug!(table = %self.set.table_name(), "update staged");
        self.set.update(active);
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(?key))]
    async fn delete(&self, key: PrimaryKeyOf<A>) -> Result<()> {
        let existing = self.find_existing(key).await?;
        debug!(table = %self.set.table_name(), "delete staged");
        self.set.remove(existing.into_active_model());
        Ok(())
    }
}
