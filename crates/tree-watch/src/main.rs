//! tree-watch: Mirrors a vault's folder tree and keeps it in sync with the disk.
//!
//! Scans the configured root once, then applies every create, delete and
//! rename the file watcher reports, printing the tree after each change.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shadow_tree::{ShadowTree, TreeUpdate};
use tree_watch::render::render_outline;
use tree_watch::watcher::{EventFilter, FileWatcher};
use tree_watch::{Host, NativeListings, WatchConfig};

#[derive(Parser, Debug)]
#[command(name = "tree-watch")]
#[command(about = "Mirror a vault's folder tree and keep it in sync with the filesystem")]
struct Args {
    /// Path to the vault directory
    #[arg(short, long, env = "TREE_WATCH_VAULT")]
    vault: String,

    /// Folder inside the vault to mirror (defaults to the whole vault)
    #[arg(short, long, env = "TREE_WATCH_ROOT", default_value = "")]
    root: String,

    /// Document extensions to include
    #[arg(
        short,
        long = "extension",
        env = "TREE_WATCH_EXTENSIONS",
        value_delimiter = ',',
        default_value = "md"
    )]
    extensions: Vec<String>,

    /// Print each update as JSON instead of an outline
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn print_update(update: &TreeUpdate, origin: &str, json: bool) {
    if json {
        let value = serde_json::json!({
            "change": update.change,
            "tree": &*update.snapshot,
        });
        println!("{}", value);
    } else {
        println!("{}", render_outline(&update.snapshot, origin));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or debug with --verbose)
    let default_filter = if args.verbose {
        "debug,tree_watch=debug,shadow_tree=debug"
    } else {
        "info,tree_watch=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = WatchConfig::new(&args.vault, &args.root, &args.extensions)?;
    info!("Starting tree-watch");
    info!("Vault path: {:?}", config.vault_path);
    info!("Mirroring {:?} as {:?}", config.root_path(), config.root);

    let listings = NativeListings::new(config.vault_path.clone(), config.extensions.clone());
    let mut host = Host::new(ShadowTree::new(config.root.clone()), listings);

    let origin = config.root.clone();
    let json = args.json;
    let _subscription = host
        .tree()
        .bus()
        .subscribe(move |update| print_update(update, &origin, json));

    let directories = host.scan().await?;
    info!(
        "Scanned {} director(ies), {} node(s)",
        directories,
        host.tree().repository().len()
    );

    let mut watcher = FileWatcher::new(EventFilter::from(&config))?;
    info!("Watching {:?}. Press Ctrl+C to stop.", watcher.vault_path());

    loop {
        tokio::select! {
            Some(event) = watcher.event_rx().recv() => {
                if let Err(e) = host.apply(event.clone()).await {
                    error!("Failed to apply {:?}: {}", event, e);
                }
            }

            // Handle graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
