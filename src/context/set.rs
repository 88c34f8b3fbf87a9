use super::{DataContext, EntityState, tracker::table_name};
use crate::error::{Error, Result};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, IdenStatic, IntoActiveModel, Iterable, PrimaryKeyToColumn,
    PrimaryKeyTrait, QueryFilter, Select,
};
use std::marker::PhantomData;

/// A typed collection of one entity, borrowed from a [`DataContext`].
///
/// Reads go straight to the connection; writes are staged on the context's
/// tracker until [`DataContext::save_changes`].
pub struct EntitySet<'a, A, C = DatabaseConnection> {
    context: &'a DataContext<C>,
    model: PhantomData<fn() -> A>,
}

impl<A, C> Clone for EntitySet<'_, A, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, C> Copy for EntitySet<'_, A, C> {}

impl<A: ActiveModelTrait, C> std::fmt::Debug for EntitySet<'_, A, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySet")
            .field("table", &table_name::<A>())
            .finish()
    }
}

impl<'a, A: ActiveModelTrait, C> EntitySet<'a, A, C> {
    pub(crate) fn new(context: &'a DataContext<C>) -> Self {
        Self {
            context,
            model: PhantomData,
        }
    }

    pub fn context(&self) -> &'a DataContext<C> {
        self.context
    }

    pub fn table_name(&self) -> String {
        table_name::<A>()
    }

    pub fn find(&self) -> Select<A::Entity> {
        A::Entity::find()
    }

    pub fn find_by_id<T>(&self, values: T) -> Select<A::Entity>
    where
        T: Into<<<A::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        A::Entity::find_by_id(values)
    }
}

impl<A, C> EntitySet<'_, A, C>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    /// Stages an insert.
    pub fn add(&self, model: A) {
        self.context.tracker().track(model, EntityState::Added);
    }

    /// Stages an update of every set column.
    pub fn update(&self, model: A) {
        self.context.tracker().track(model, EntityState::Modified);
    }

    /// Stages a delete by primary key.
    pub fn remove(&self, model: A) {
        self.context.tracker().track(model, EntityState::Deleted);
    }

    /// Starts tracking a model that already exists in the store.
    pub fn attach(&self, model: A) {
        self.context.tracker().track(model, EntityState::Unchanged);
    }
}

impl<A, C> EntitySet<'_, A, C>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    /// Re-reads the model's row and tracks it as Unchanged in place of
    /// anything staged for it. `None` when the row no longer exists.
    pub async fn reload(&self, model: &A) -> Result<Option<A>> {
        let mut condition = Condition::all();
        for key in <<A::Entity as EntityTrait>::PrimaryKey as Iterable>::iter() {
            let column = key.into_column();
            let Some(value) = model.get(column).into_value() else {
                return Err(Error::Validation(format!(
                    "cannot reload {} without a value for {}",
                    self.table_name(),
                    column.as_str()
                )));
            };
            condition = condition.add(ColumnTrait::eq(&column, value));
        }

        let stored = A::Entity::find()
            .filter(condition)
            .one(self.context.connection())
            .await?;
        self.context.tracker().detach(model);
        Ok(stored.map(|stored| {
            let stored = stored.into_active_model();
            self.attach(stored.clone());
            stored
        }))
    }
}
