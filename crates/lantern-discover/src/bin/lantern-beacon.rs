use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use lantern_discover::{
    BeaconEmitter, BeaconListener, DiscoverConfig, DiscoverHandler, Discovery, HostEvent, logging,
};

#[derive(Parser)]
#[command(name = "lantern-beacon", about = "LAN peer discovery beacon")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Broadcast beacon pairs advertising the configured keys
    Emit,
    /// Listen for beacon pairs and report recognized peers
    Listen,
}

/// Prints every recognized peer to the log.
struct ReportHandler;

impl DiscoverHandler for ReportHandler {
    fn on_beacon(&mut self, discovery: Discovery) -> bool {
        if discovery.pubkey.is_null() {
            tracing::info!(
                "peer present at {} (no keys advertised), challenge {}",
                discovery.source,
                discovery.challenge
            );
        } else {
            tracing::info!(
                "discovered {} ({}) at {}",
                discovery.pubkey,
                discovery.tag.as_deref().unwrap_or("untagged"),
                discovery.source
            );
        }
        true
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        logging::init_json();
    } else {
        logging::init();
    }

    let config = match &cli.config {
        Some(path) => match DiscoverConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("failed to load config from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => DiscoverConfig::default(),
    };

    let keystore = match config.build_keystore() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("bad key configuration: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Emit => {
            let emitter = match BeaconEmitter::bind(config, keystore).await {
                Ok(emitter) => emitter,
                Err(e) => {
                    eprintln!("failed to bind emitter socket: {e}");
                    std::process::exit(1);
                }
            };

            let stop = emitter.shutdown_token();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("received SIGINT, shutting down");
                stop.signal_stop();
            });

            emitter.run().await
        }
        Command::Listen => {
            let listener = match BeaconListener::bind(&config, keystore) {
                Ok(listener) => listener,
                Err(e) => {
                    eprintln!("failed to bind listener socket: {e}");
                    std::process::exit(1);
                }
            };

            let (host_tx, host_rx) = mpsc::channel(8);
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("received SIGINT, shutting down");
                let _ = host_tx.send(HostEvent::Shutdown).await;
            });

            listener.run(ReportHandler, host_rx).await
        }
    };

    if let Err(e) = result {
        tracing::error!("beacon loop failed: {e}");
        std::process::exit(1);
    }
}
