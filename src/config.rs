use clap::Args;
use sea_orm::ConnectOptions;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://film_catalog.db?mode=rwc";

/// Connection settings, read from flags, the environment or a `.env` file.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[arg(
        global = true,
        long,
        env = "DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL,
        help = "Database URL"
    )]
    pub database_url: String,

    #[arg(
        global = true,
        long,
        env = "DATABASE_MAX_CONNECTIONS",
        help = "Upper bound of the connection pool; SQLite defaults to a single connection"
    )]
    pub max_connections: Option<u32>,

    #[arg(
        global = true,
        long,
        env = "DATABASE_ACQUIRE_TIMEOUT",
        default_value_t = 30,
        help = "Seconds to wait for a pooled connection"
    )]
    pub acquire_timeout: u64,

    #[arg(
        global = true,
        long,
        env = "DATABASE_SQL_LOGGING",
        default_value_t = false,
        help = "Log every statement sent to the database"
    )]
    pub sql_logging: bool,

    #[arg(
        global = true,
        long = "no-migrate",
        action = clap::ArgAction::SetFalse,
        help = "Do not apply pending migrations on startup"
    )]
    pub migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: None,
            acquire_timeout: 30,
            sql_logging: false,
            migrate: true,
        }
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.database_url.clone());
        if let Some(max_connections) = self.max_connections {
            options.max_connections(max_connections);
        }
        options
            .acquire_timeout(Duration::from_secs(self.acquire_timeout))
            .sqlx_logging(self.sql_logging)
            .sqlx_logging_level(log::LevelFilter::Debug);
        options
    }
}
