//! # todo-feed
//!
//! Binary entry point: `serve` runs the HTTP server, `seed` resets the store,
//! and `list`/`add`/`toggle`/`delete` talk to a running server.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use todo_client::{filter_todos_by_content, TodoController};
use todo_core::{Todo, TodoId};
use todo_server::{ServerConfig, TodoServer};
use todo_settings::{LoggingSettings, StorageBackend, StorageSettings, TodoSettings};
use todo_store::{seed, Database, JsonFileStore, MemoryStore, SqliteStore, TodoRepo, TodoStore};
use todo_telemetry::{init_telemetry, parse_level, TelemetryConfig};

/// Paginated todo list: server and command-line client.
#[derive(Parser, Debug)]
#[command(name = "todo-feed", about = "Paginated todo list server and client", version)]
struct Cli {
    /// Settings file (defaults to ~/.todo-feed/settings.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend: json, sqlite or memory.
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    /// Data file for the json and sqlite backends.
    #[arg(long, global = true)]
    data_path: Option<PathBuf>,

    /// Host to bind.
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to bind (0 for auto-assign).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Server used by the client subcommands.
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Default log level (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON log lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server until Ctrl-C.
    Serve,
    /// Wipe the store and insert demo todos (or the given contents).
    Seed {
        contents: Vec<String>,
    },
    /// Print one page of todos from a running server.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Case-insensitive content filter.
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a todo.
    Add {
        content: String,
    },
    /// Flip a todo's done flag.
    Toggle {
        id: String,
    },
    /// Delete a todo.
    Delete {
        id: String,
    },
}

impl Cli {
    /// File and env layers first, then command-line flags.
    fn settings(&self) -> Result<TodoSettings> {
        let path = self.config.clone().unwrap_or_else(todo_settings::settings_path);
        let mut settings = todo_settings::load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;

        if let Some(backend) = self.backend {
            settings.storage.backend = backend;
        }
        if let Some(ref path) = self.data_path {
            settings.storage.path = path.display().to_string();
        }
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref url) = self.server_url {
            settings.client.server_url.clone_from(url);
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
        Ok(settings)
    }
}

fn telemetry_config(logging: &LoggingSettings) -> TelemetryConfig {
    TelemetryConfig {
        log_level: parse_level(&logging.level).unwrap_or(Level::INFO),
        json: logging.json,
        ..TelemetryConfig::default()
    }
}

fn open_store(storage: &StorageSettings) -> Result<Arc<dyn TodoStore>> {
    let path = Path::new(&storage.path);
    let store: Arc<dyn TodoStore> = match storage.backend {
        StorageBackend::Json => Arc::new(
            JsonFileStore::open(path)
                .with_context(|| format!("Failed to open JSON store at {}", path.display()))?,
        ),
        StorageBackend::Sqlite => Arc::new(SqliteStore::new(
            Database::open(path)
                .with_context(|| format!("Failed to open database at {}", path.display()))?,
        )),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

fn print_todo(todo: &Todo) {
    let mark = if todo.done { "x" } else { " " };
    println!("[{mark}] {}  ({}, {})", todo.content, todo.id, todo.date_string());
}

async fn serve(settings: &TodoSettings) -> Result<()> {
    let store = open_store(&settings.storage)?;
    let config = ServerConfig::from(&settings.server);
    let handle = TodoServer::new(config, TodoRepo::new(store))
        .listen()
        .await
        .context("Failed to start server")?;

    info!(url = %handle.base_url(), "todo server ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl+c")?;

    info!("shutting down");
    handle.stop().await;
    Ok(())
}

fn seed_store(settings: &TodoSettings, contents: &[String]) -> Result<()> {
    let store = open_store(&settings.storage)?;
    let todos = if contents.is_empty() {
        seed::reseed(store.as_ref())
    } else {
        seed::reseed_with(store.as_ref(), contents)
    }
    .context("Failed to seed store")?;

    for todo in &todos {
        print_todo(todo);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    init_telemetry(&telemetry_config(&settings.logging));

    let controller = || TodoController::from_url(settings.client.server_url.clone());

    match cli.command {
        Command::Serve => serve(&settings).await?,
        Command::Seed { ref contents } => seed_store(&settings, contents)?,
        Command::List { page, ref search } => {
            let result = controller().get(page).await.context("Failed to list todos")?;
            let search = search.as_deref().unwrap_or("");
            for todo in filter_todos_by_content(search, &result.todos) {
                print_todo(todo);
            }
            println!("page {page}/{}, {} total", result.pages, result.total);
        }
        Command::Add { ref content } => {
            let mut failure = None;
            controller()
                .create(content, |todo| print_todo(&todo), |err| failure = Some(err))
                .await;
            if let Some(err) = failure {
                return Err(err).context("Failed to create todo");
            }
        }
        Command::Toggle { ref id } => {
            let todo = controller()
                .toggle_done(&TodoId::from_raw(id.as_str()), || {})
                .await
                .context("Failed to toggle todo")?;
            print_todo(&todo);
        }
        Command::Delete { ref id } => {
            controller()
                .delete_by_id(&TodoId::from_raw(id.as_str()))
                .await
                .context("Failed to delete todo")?;
            println!("deleted {id}");
        }
    }
    Ok(())
}
