use crate::config::DatabaseConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Browse and edit the film catalog")]
pub struct Cli {
    #[arg(global = true, short = 'v', long, help = "Show debug messages")]
    pub verbose: bool,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum Commands {
    #[command(about = "List films with creator and cast, optionally for one released year")]
    Films {
        #[arg(long, help = "Released year, 1950 or later")]
        year: Option<i32>,
    },
    #[command(about = "Show one film")]
    Film { id: i32 },
    #[command(about = "Add a film")]
    AddFilm {
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: i32,
        #[arg(long, help = "Running time in minutes")]
        duration: i32,
        #[arg(long, default_value_t = 1)]
        creator_id: i32,
    },
    #[command(about = "Update a film; omitted fields keep their value")]
    UpdateFilm {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        duration: Option<i32>,
        #[arg(long)]
        creator_id: Option<i32>,
    },
    #[command(about = "Delete a film and its cast rows")]
    DeleteFilm { id: i32 },
    #[command(about = "Add an actor, optionally cast in a film")]
    AddActor {
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        firstname: String,
        #[arg(long, requires = "character_firstname")]
        film_id: Option<i32>,
        #[arg(long, requires = "film_id")]
        character_firstname: Option<String>,
        #[arg(long, requires = "film_id")]
        character_lastname: Option<String>,
    },
    #[command(about = "Show the characters of one film")]
    Cast { film_id: i32 },
    #[command(about = "List creators and actors with their films")]
    Relations,
    #[command(about = "Filtering, sorting, paging, aggregates, projections and SQL")]
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },
    #[command(about = "Walk a film through the change tracker states without saving")]
    Tracker {
        #[arg(default_value_t = 1)]
        film_id: i32,
    },
    #[command(about = "Check the connection and list applied and pending migrations")]
    Status,
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum QueryCommands {
    #[command(about = "Filter films")]
    Filter {
        #[arg(long, default_value_t = 150)]
        longer_than: i32,
        #[arg(long, default_value_t = 2010)]
        released_after: i32,
        #[arg(long)]
        title: Option<String>,
    },
    #[command(about = "Sort films by title and by released year")]
    Sort {
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
    #[command(about = "Page through films")]
    Page {
        #[arg(long, default_value_t = 1)]
        number: u64,
        #[arg(long, default_value_t = 2)]
        size: u64,
    },
    #[command(about = "Duration statistics")]
    Stats,
    #[command(about = "Titles, summaries and directors")]
    Projections {
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
    #[command(about = "Print the SQL of a joined, filtered and sorted query")]
    Sql {
        #[arg(long, default_value_t = 180)]
        longer_than: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_query_commands() {
        let cli = Cli::try_parse_from(["film-catalog", "query", "page", "--number", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Query {
                command: QueryCommands::Page { number: 2, size: 2 }
            }
        );
        assert!(cli.database.migrate);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "film-catalog",
            "films",
            "--year",
            "2009",
            "-v",
            "--no-migrate",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(!cli.database.migrate);
        assert_eq!(cli.database.database_url, "sqlite::memory:");
        assert_eq!(cli.command, Commands::Films { year: Some(2009) });
    }

    #[test]
    fn characters_need_a_film() {
        let err = Cli::try_parse_from([
            "film-catalog",
            "add-actor",
            "--lastname",
            "Lang",
            "--firstname",
            "Stephen",
            "--character-firstname",
            "Miles",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "film-catalog",
            "add-actor",
            "--lastname",
            "Lang",
            "--firstname",
            "Stephen",
            "--film-id",
            "1",
            "--character-firstname",
            "Miles",
            "--character-lastname",
            "Quaritch",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::AddActor {
                film_id: Some(1),
                ..
            }
        ));
    }
}
