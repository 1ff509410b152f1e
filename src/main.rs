//! CLI for wspubsub
//!
//! Loads configuration, applies command-line overrides and runs the
//! WebSocket server until it fails to bind or receives Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use wspubsub::broker::SubscriptionRegistry;
use wspubsub::config::{Settings, load_config, load_config_from};
use wspubsub::transport::start_websocket_server;
use wspubsub::utils::{self, logging};

#[derive(Parser)]
#[command(name = "wspubsub", version, about = "In-memory pub/sub over WebSockets")]
struct Cli {
    /// The address to bind the server to
    #[arg(long = "bind-addr")]
    bind_addr: Option<String>,

    /// The port to bind the server to
    #[arg(long = "bind-port")]
    bind_port: Option<u16>,

    /// Configuration file (defaults to config/default.*)
    #[arg(long)]
    config: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(host) = self.bind_addr {
            settings.server.host = host;
        }
        if let Some(port) = self.bind_port {
            settings.server.port = port;
        }
        if let Some(level) = self.log_level {
            settings.log.level = level;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    let settings = match loaded {
        Ok(settings) => cli.apply(settings),
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&settings.log.level);

    match run_server(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_server(settings: Settings) -> utils::Result<()> {
    let registry = Arc::new(SubscriptionRegistry::new());

    tokio::select! {
        result = start_websocket_server(&settings.server, registry) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
            Ok(())
        }
    }
}
