//! MiniDB CLI
//!
//! Runs a single command against a store directory.

use clap::{Parser, Subcommand};
use minidb::{Config, MiniDbError, Store, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// MiniDB CLI
#[derive(Parser, Debug)]
#[command(name = "minidb-cli")]
#[command(about = "CLI for the MiniDB key-value store")]
#[command(version)]
struct Args {
    /// Store directory
    #[arg(short, long, default_value = "./minidb_data")]
    data_dir: String,

    /// fsync after every write
    #[arg(long)]
    sync_every_write: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Compact the log
    Merge,

    /// Print key count and log size
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,minidb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> minidb::Result<()> {
    let sync_strategy = if args.sync_every_write {
        SyncStrategy::EveryWrite
    } else {
        Config::default().sync_strategy
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(sync_strategy)
        .build();

    let store = Store::open_with(config)?;

    match args.command {
        Commands::Get { key } => match store.get(key.as_bytes()) {
            Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
            Err(MiniDbError::KeyNotFound) => println!("(nil)"),
            Err(e) => return Err(e),
        },
        Commands::Put { key, value } => {
            store.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Del { key } => {
            store.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Merge => {
            let before = store.log_size();
            store.merge()?;
            println!("merged: {} -> {} bytes", before, store.log_size());
        }
        Commands::Stats => {
            println!("dir:       {}", store.dir().display());
            println!("live keys: {}", store.len());
            println!("log bytes: {}", store.log_size());
        }
    }

    store.close()
}
