use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// An error from a catalog operation
#[derive(Error, Debug)]
pub enum Error {
    /// The input violates a business rule; nothing was sent to the store
    #[error("Validation failed: {0}")]
    Validation(String),
    /// A key lookup on update or delete found no row
    #[error("{entity} with key {key} was not found")]
    NotFound {
        /// Table of the missing row
        entity: String,
        /// Rendered primary key
        key: String,
    },
    /// The store could not be reached
    #[error("Connection Error: {0}")]
    Connectivity(#[source] DbErr),
    /// The store rejected a write because of a schema constraint
    #[error("Constraint Violation: {0}")]
    Constraint(#[source] DbErr),
    /// Any other database error
    #[error(transparent)]
    Database(DbErr),
}

/// Result type used throughout the catalog
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Connectivity(err),
            _ if err.sql_err().is_some() || is_constraint_message(&err) => Self::Constraint(err),
            _ => Self::Database(err),
        }
    }
}

/// `sql_err` only knows unique and foreign key violations; check and other
/// constraint failures are recognised from the driver message.
fn is_constraint_message(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(_))
        | DbErr::Query(RuntimeErr::SqlxError(_))
        | DbErr::Exec(RuntimeErr::Internal(_))
        | DbErr::Query(RuntimeErr::Internal(_)) => {
            let message = err.to_string().to_lowercase();
            message.contains("check constraint") || message.contains("constraint failed")
        }
        _ => false,
    }
}
