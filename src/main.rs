//! Pocketweb main entry point

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use pocketweb_api::{start_server, AppState};
use pocketweb_config::Config;
use pocketweb_core::Books;
use pocketweb_store::{KvStore, MemoryKvStore};

#[derive(Parser, Debug)]
#[command(name = "pocketweb")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight household budgeting service with smart spreadsheet ingestion", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let config = if args.config.exists() {
            Config::load(args.config.clone())?
        } else {
            warn!(
                "config file {} not found, using defaults",
                args.config.display()
            );
            Config::defaults()
        };

        std::fs::create_dir_all(&config.data.path)?;
        let snapshot = config.store_path();
        info!("store snapshot: {}", snapshot.display());
        let store: Box<dyn KvStore> = Box::new(MemoryKvStore::open(snapshot)?);

        let host = config.server.host.clone();
        let port = config.server.port;
        let state = AppState {
            books: Arc::new(Books::new(store, config)),
        };
        start_server(state, &host, port).await
    })
}
