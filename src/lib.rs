#![deny(missing_debug_implementations)]

//! # film-catalog
//!
//! A Code-First film catalog on [SeaORM](https://www.sea-ql.org/SeaORM/).
//!
//! Entities are declared in [`entity`], the schema and seed rows live in the
//! `migration` crate, and everything is reached through a [`DataContext`]:
//!
//! ```no_run
//! use film_catalog::{DataContext, FilmService};
//!
//! # async fn run() -> film_catalog::Result<()> {
//! let context = DataContext::connect_url("sqlite::memory:").await?;
//! let service = FilmService::new(&context);
//! for details in service.get_all_film_by_released_year(2009).await? {
//!     println!("{} by {}", details.film.title, details.creator.full_name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Writes go through repositories and are staged until
//! [`DataContext::save_changes`], which applies them in one transaction.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod query;
pub mod repository;
pub mod service;

pub use config::DatabaseConfig;
pub use context::{DataContext, EntitySet, EntityState, MigrationReport, TrackedEntry};
pub use error::{Error, Result};
pub use query::FilmQueries;
pub use repository::{EntityRepository, FilmDetails, FilmRepository, Repository, Role};
pub use service::FilmService;
