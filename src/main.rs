use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use family_tree_wizard::{
    config::{Config, DataSource, LogFormat},
    lookup::lookup_family,
    storage::{open_store, PersonStore},
    wizard::{ConsoleUi, WizardStateMachine},
};

/// Build a family tree by chatting with a wizard.
#[derive(Parser, Debug)]
#[command(name = "family-tree-wizard", version, about)]
struct Cli {
    /// Use the in-memory sample family instead of the database
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the chat wizard (default)
    Chat,

    /// Show a person's immediate family
    Lookup {
        /// Full name as recorded
        #[arg(long)]
        name: String,

        /// Year of birth
        #[arg(long)]
        year: i32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.memory {
        config.data_source = DataSource::Memory;
    }

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Family tree wizard starting..."
    );

    // Initialize storage
    let store = match open_store(config.data_source, &config.database).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to initialize person store");
            return Err(e.into());
        }
    };

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(store, &config).await?,
        Command::Lookup { name, year } => match lookup_family(store.as_ref(), &name, year).await? {
            Some(summary) => print!("{}", summary),
            None => println!("No one named '{}' born in {} is on record.", name, year),
        },
    }

    Ok(())
}

/// Read chat lines from stdin until EOF.
///
/// A finished wizard keeps reading so the user can start another family.
async fn run_chat(store: Arc<dyn PersonStore>, config: &Config) -> anyhow::Result<()> {
    let mut wizard = WizardStateMachine::new(
        store,
        config.wizard.clone(),
        ConsoleUi::new(std::io::stdout()),
    );
    wizard.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        wizard.handle_input(&line).await;
    }

    debug!(
        state = %serde_json::to_string(wizard.state()).unwrap_or_default(),
        "Final session state"
    );
    info!("Wizard session ended");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
