//! Runs a parsed [`Cli`] against the catalog and prints the results.

use crate::cli::{Cli, Commands, QueryCommands};
use crate::context::DataContext;
use crate::entity::{actor, film, film_actor};
use crate::error::{Error, Result};
use crate::query::FilmQueries;
use crate::repository::{EntityRepository, FilmDetails, Repository};
use crate::service::FilmService;
use sea_orm::{ActiveValue::Set, ConnectionTrait, TransactionTrait, TryIntoModel};
use std::fmt::Display;

pub fn handle_error<E>(error: E)
where
    E: Display,
{
    eprintln!("{error}");
    ::std::process::exit(1);
}

pub async fn run_command(cli: Cli) -> Result<()> {
    let context = DataContext::connect(&cli.database).await?;

    match cli.command {
        Commands::Films { year } => run_films(&context, year).await,
        Commands::Film { id } => {
            let details = FilmService::new(&context)
                .get_film(id)
                .await?
                .ok_or_else(|| Error::not_found("films", id.to_string()))?;
            print_film(&details);
            Ok(())
        }
        Commands::AddFilm {
            title,
            year,
            duration,
            creator_id,
        } => {
            let film = film::Model {
                id: 0,
                title,
                released_year: year,
                duration,
                creator_id,
            };
            FilmService::new(&context).add_film(film).await?;
            let saved = context.save_changes().await?;
            println!("{saved} film(s) added");
            Ok(())
        }
        Commands::UpdateFilm {
            id,
            title,
            year,
            duration,
            creator_id,
        } => {
            let service = FilmService::new(&context);
            let current = service
                .get_film(id)
                .await?
                .ok_or_else(|| Error::not_found("films", id.to_string()))?
                .film;
            let film = film::Model {
                title: title.unwrap_or(current.title),
                released_year: year.unwrap_or(current.released_year),
                duration: duration.unwrap_or(current.duration),
                creator_id: creator_id.unwrap_or(current.creator_id),
                ..current
            };
            service.update_film(id, film).await?;
            let saved = context.save_changes().await?;
            println!("{saved} film(s) updated");
            Ok(())
        }
        Commands::DeleteFilm { id } => {
            FilmService::new(&context).delete_film(id).await?;
            let saved = context.save_changes().await?;
            println!("{saved} film(s) deleted");
            Ok(())
        }
        Commands::AddActor {
            lastname,
            firstname,
            film_id,
            character_firstname,
            character_lastname,
        } => {
            let role = film_id.zip(character_firstname);
            run_add_actor(&context, lastname, firstname, role, character_lastname).await
        }
        Commands::Cast { film_id } => {
            for role in FilmService::new(&context).get_cast(film_id).await? {
                println!(
                    "{} plays {}",
                    role.actor.full_name(),
                    role.character.character_name()
                );
            }
            Ok(())
        }
        Commands::Relations => run_relations(&context).await,
        Commands::Query { command } => run_query(&context, command).await,
        Commands::Tracker { film_id } => run_tracker(&context, film_id).await,
        Commands::Status => {
            let reachable = context.can_connect().await;
            println!("Can connect: {reachable}");
            let report = context.migration_status().await?;
            for name in &report.applied {
                println!("Applied  {name}");
            }
            for name in &report.pending {
                println!("Pending  {name}");
            }
            Ok(())
        }
    }
}

/// Reads inside a transaction, committing on success.
async fn run_films<C>(context: &DataContext<C>, year: Option<i32>) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    let txn = context.begin().await?;
    let service = FilmService::new(&txn);
    let films = match year {
        Some(year) => service.get_all_film_by_released_year(year).await,
        None => service.get_all_films().await,
    };
    match films {
        Ok(films) => {
            txn.commit().await?;
            println!("> Commit");
            films.iter().for_each(print_film);
            Ok(())
        }
        Err(err) => {
            txn.rollback().await?;
            println!("> Rollback");
            Err(err)
        }
    }
}

/// Adds the actor and its role in one transaction; the role needs the
/// generated actor id, so the actor is saved first.
async fn run_add_actor<C>(
    context: &DataContext<C>,
    lastname: String,
    firstname: String,
    role: Option<(i32, String)>,
    character_lastname: Option<String>,
) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    let txn = context.begin().await?;
    let actors = EntityRepository::<actor::ActiveModel, _>::new(&txn);
    actors
        .add(actor::Model {
            id: 0,
            lastname,
            firstname,
        })
        .await?;
    txn.save_changes().await?;

    let actor = txn
        .tracker()
        .models::<actor::ActiveModel>()
        .pop()
        .ok_or_else(|| Error::not_found("actors", "newly added"))?
        .try_into_model()?;

    if let Some((film_id, character_firstname)) = role {
        txn.film_actors().add(film_actor::ActiveModel {
            actor_id: Set(actor.id),
            film_id: Set(film_id),
            character_lastname: Set(character_lastname),
            character_firstname: Set(character_firstname),
        });
        txn.save_changes().await?;
    }
    txn.commit().await?;

    println!("Added actor {} ({})", actor.full_name(), actor.id);
    Ok(())
}

async fn run_relations<C>(context: &DataContext<C>) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let queries = FilmQueries::new(context);
    for (creator, films) in queries.creators_with_films().await? {
        println!("{} created {} film(s)", creator.full_name(), films.len());
        for film in films {
            println!("  - {} ({})", film.title, film.released_year);
        }
    }
    for (actor, films) in queries.actors_with_films().await? {
        let titles: Vec<_> = films.iter().map(|film| film.title.as_str()).collect();
        println!("{} plays in {}", actor.full_name(), titles.join(", "));
    }
    Ok(())
}

async fn run_query<C>(context: &DataContext<C>, command: QueryCommands) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let queries = FilmQueries::new(context);
    match command {
        QueryCommands::Filter {
            longer_than,
            released_after,
            title,
        } => {
            print_titles(
                &format!("Longer than {longer_than} min"),
                &queries.longer_than(longer_than).await?,
            );
            print_titles(
                &format!("Released after {released_after} and longer than {longer_than} min"),
                &queries
                    .released_after_and_longer_than(released_after, longer_than)
                    .await?,
            );
            if let Some(title) = title {
                print_titles(
                    &format!("Title contains \"{title}\""),
                    &queries.title_contains(&title).await?,
                );
            }
        }
        QueryCommands::Sort { limit } => {
            print_titles("By title", &queries.by_title(limit).await?);
            print_titles("By year, newest first", &queries.by_year_desc(limit).await?);
            print_titles(
                "By year then title",
                &queries.by_year_desc_then_title(limit).await?,
            );
        }
        QueryCommands::Page { number, size } => {
            let page = queries.page(number, size).await?;
            print_titles(
                &format!(
                    "Page {}/{} ({} film(s))",
                    page.page_number, page.total_pages, page.total_items
                ),
                &page.items,
            );
        }
        QueryCommands::Stats => {
            let stats = queries.statistics().await?;
            println!("Films:    {}", stats.count);
            if let Some(average) = stats.average_duration {
                println!("Average:  {average:.1} min");
            }
            if let (Some(longest), Some(shortest)) = (stats.longest, stats.shortest) {
                println!("Longest:  {longest} min");
                println!("Shortest: {shortest} min");
            }
            println!("Any over 3h: {}", queries.any_longer_than(180).await?);
        }
        QueryCommands::Projections { limit } => {
            println!("{}", queries.titles(limit).await?.join(", "));
            for summary in queries.summaries(limit).await? {
                println!(
                    "{} ({}): {:.2} h",
                    summary.title, summary.released_year, summary.hours
                );
            }
            for directed in queries.directed_by(limit).await? {
                println!("{} by {}", directed.title, directed.director);
            }
        }
        QueryCommands::Sql { longer_than } => {
            println!("{}", queries.long_films_with_creator_sql(longer_than));
        }
    }
    Ok(())
}

async fn run_tracker<C>(context: &DataContext<C>, film_id: i32) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let films = context.films();
    let film = films
        .find_by_id(film_id)
        .one(context.connection())
        .await?
        .ok_or_else(|| Error::not_found("films", film_id.to_string()))?;
    let tracker = context.tracker();

    let mut active: film::ActiveModel = film.clone().into();
    println!("Loaded:   {}", tracker.state_of(&active));

    films.attach(active.clone());
    println!("Attached: {}", tracker.state_of(&active));

    active.duration = Set(film.duration + 1);
    films.update(active.clone());
    println!("Changed:  {}", tracker.state_of(&active));

    let active = films
        .reload(&active)
        .await?
        .ok_or_else(|| Error::not_found("films", film_id.to_string()))?;
    println!("Reloaded: {}", tracker.state_of(&active));

    films.remove(active.clone());
    println!("Removed:  {}", tracker.state_of(&active));

    for entry in tracker.entries() {
        println!("  {} [{}] {}", entry.entity, entry.key, entry.state);
    }
    tracker.clear();
    println!("Cleared:  {}", tracker.state_of(&active));
    Ok(())
}

fn print_film(details: &FilmDetails) {
    let FilmDetails {
        film,
        creator,
        actors,
    } = details;
    println!(
        "#{} {} ({}, {} min) by {}",
        film.id,
        film.title,
        film.released_year,
        film.duration,
        creator.full_name()
    );
    for actor in actors {
        println!("  - {}", actor.full_name());
    }
}

fn print_titles(heading: &str, films: &[film::Model]) {
    println!("{heading}:");
    for film in films {
        println!("  - {} ({}, {} min)", film.title, film.released_year, film.duration);
    }
}
