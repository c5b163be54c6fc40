//! Serve command for running the signaling relay
//!
//! The server exposes room creation over HTTP and relays WebRTC signaling
//! messages between the WebSocket connections of each room.

use anyhow::Result;
use clap::Args;
use meetcode_server::{MeetServer, ServerConfig};
use tracing::{info, warn};

use crate::config::MeetConfig;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Allowed CORS origin; repeat for several (overrides config)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded configuration
    fn server_config(&self, config: &MeetConfig) -> ServerConfig {
        let mut server = config.server_config();
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if !self.cors_origins.is_empty() {
            server.cors_origins = self.cors_origins.clone();
        }
        server
    }
}

/// Run the server in the foreground until Ctrl-C
pub async fn run(args: ServeArgs, config: MeetConfig) -> Result<()> {
    let server_config = args.server_config(&config);
    info!(
        "Starting meetcode server on {}:{}",
        server_config.host, server_config.port
    );

    let server = MeetServer::new(server_config);
    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    server.run().await?;
    Ok(())
}
