use clap::Parser;
use film_catalog::cli::Cli;
use film_catalog::commands::{handle_error, run_command};
use tracing_subscriber::{EnvFilter, prelude::*};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    run_command(cli).await.unwrap_or_else(handle_error);
}

fn init_tracing(verbose: bool) {
    let filter = match verbose {
        true => "debug",
        false => "film_catalog=info,sea_orm_migration=info",
    };
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if verbose {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(tracing_subscriber::fmt::layer())
            .init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(false)
            .without_time()
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init()
    };
}
