mod api;
mod app;
mod cache;
mod config;
mod event;
mod install;
mod logging;
mod model;
mod ui;
mod users;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

use api::RestApiClient;
use cache::SqliteStore;
use config::{ApiConfig, Config};
use install::{Installer, Uninstaller};
use model::{ItemModel, UsersModel, USERS_MODEL_KEY};

#[derive(Parser, Debug)]
#[command(name = "u9s")]
#[command(about = "A terminal browser for a remote users REST API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/u9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the REST API
  #[arg(long)]
  api_root: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print all users
  List,
  /// Print a single user
  Show {
    id: i64,
    /// Print formatted details instead of the raw record
    #[arg(long)]
    details: bool,
  },
  /// Remove all cached data owned by u9s
  Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override API root if specified on command line
  let config = if let Some(root) = args.api_root {
    Config {
      api: ApiConfig { root, ..config.api },
      ..config
    }
  } else {
    config
  };

  let _log_guard = logging::init(&config)?;

  let store = match &config.cache.path {
    Some(path) => SqliteStore::open(path)?,
    None => SqliteStore::open_default()?,
  };

  if let Some(Command::Purge) = args.command {
    let removed = Uninstaller::new(&store, &config.cache_prefix).uninstall()?;
    println!("Removed {} cached collection(s)", removed);
    return Ok(());
  }

  let store = Arc::new(store);
  let client = RestApiClient::new(&config.api)?;
  let model = UsersModel::new(
    client,
    Arc::clone(&store),
    &config.cache_prefix,
    USERS_MODEL_KEY,
  )?;

  Installer::new(&store, &config.cache_prefix, vec![model.cache_key().to_string()])
    .after_install()?;

  match args.command {
    Some(Command::List) => {
      let items = model.all_items().await?;
      if items.is_empty() {
        println!("No users found.");
      }
      for row in users::user_rows(items.items()) {
        println!("{:<30} {:>5}  {}", row.name, row.id, row.username);
      }
    }
    Some(Command::Show { id, details }) => {
      let item = model.single_item(id).await?;
      if details {
        for (field, value) in users::user_details(&item) {
          println!("{:<10}{}", field, value);
        }
      } else {
        println!("{}", serde_json::to_string_pretty(&item)?);
      }
    }
    _ => {
      // Initialize and run the app
      let mut app = app::App::new(&config, Arc::new(model));
      app.run().await?;
    }
  }

  Ok(())
}
