// ABOUTME: Entry point for the lintulista binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs one list operation against SQLite.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use lintulista_access::{
    LintulistaConfig, ListAccessor, LoginOutcome, SystemClock, create_list,
};
use lintulista_core::{ListKey, ObservationRecord, SpeciesCatalog};
use lintulista_store::SqliteStore;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Shared bird life lists.
#[derive(Parser)]
#[command(name = "lintulista")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file (overrides LINTULISTA_DB)
    #[arg(global = true, long)]
    db: Option<PathBuf>,

    /// Species catalog JSON (overrides LINTULISTA_CATALOG)
    #[arg(global = true, long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new list and print its key
    CreateList {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Log in to a list and print the session token
    Login {
        #[arg(long)]
        list: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// End a session
    Logout {
        #[arg(long)]
        list: String,
        #[arg(long)]
        token: String,
    },

    /// Print every observation on a list
    Observations {
        #[arg(long)]
        list: String,
    },

    /// Record a sighting, replacing any earlier one of the same species
    Add {
        #[arg(long)]
        list: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        species: String,
        #[arg(long)]
        day: u32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: u32,
    },

    /// Remove the first sighting of a species
    Delete {
        #[arg(long)]
        list: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        species: String,
    },

    /// Print the species catalog in index order
    Species,
}

#[derive(Serialize)]
struct SpeciesEntry<'a> {
    index: usize,
    species: &'a str,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lintulista=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = LintulistaConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog;
    }

    let catalog = match &config.catalog_path {
        Some(path) => SpeciesCatalog::load(path)
            .with_context(|| format!("loading species catalog {}", path.display()))?,
        None => SpeciesCatalog::builtin()?,
    };
    let catalog = Arc::new(catalog);

    if let Commands::Species = cli.command {
        let entries: Vec<SpeciesEntry<'_>> = catalog
            .iter()
            .map(|(index, species)| SpeciesEntry { index, species })
            .collect();
        return print_json(&entries);
    }

    let store = Arc::new(
        SqliteStore::open(&config.db_path)
            .with_context(|| format!("opening database {}", config.db_path.display()))?,
    );
    let accessor = |list: &str| -> anyhow::Result<ListAccessor> {
        let key = ListKey::parse(list)?;
        Ok(ListAccessor::new(
            key,
            store.clone(),
            catalog.clone(),
            Arc::new(SystemClock),
            config.policy.clone(),
        ))
    };

    match cli.command {
        Commands::CreateList { username, password } => {
            let key = create_list(store.as_ref(), &config.policy, &username, &password).await?;
            print_json(&serde_json::json!({ "list": key }))?;
        }
        Commands::Login {
            list,
            username,
            password,
        } => match accessor(&list)?.login(&username, &password).await? {
            LoginOutcome::Granted(grant) => print_json(&grant)?,
            LoginOutcome::InvalidCredentials => bail!("invalid credentials"),
        },
        Commands::Logout { list, token } => {
            accessor(&list)?.logout(&token).await?;
            print_json(&serde_json::json!({ "loggedOut": true }))?;
        }
        Commands::Observations { list } => {
            let records = accessor(&list)?.get_observations().await?;
            print_json(&records)?;
        }
        Commands::Add {
            list,
            token,
            species,
            day,
            month,
            year,
        } => {
            let record = ObservationRecord::new(species, day, month, year);
            accessor(&list)?.add_observation(&token, &record).await?;
            print_json(&record)?;
        }
        Commands::Delete {
            list,
            token,
            species,
        } => {
            accessor(&list)?.delete_observation(&token, &species).await?;
            print_json(&serde_json::json!({ "deleted": species }))?;
        }
        Commands::Species => {}
    }

    Ok(())
}
