use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use uv_advisory::client::terminal::{
    FixedLocation, StaticPermission, TerminalRenderer, spawn_command_reader,
};
use uv_advisory::client::{
    Controller, ControllerSettings, PermissionState, Platform, ProxyClient,
};
use uv_advisory::logging::init_tracing;
use uv_advisory::{
    AppState, Coordinates, OpenWeatherMapClient, UvAdvisoryConfig, UvAdvisoryError, web,
};

#[derive(Parser, Debug)]
#[command(name = "uv-advisory", version, about = "UV index proxy and advisory client")]
struct Cli {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the proxy server (default)
    Serve {
        #[arg(long, help = "Port to listen on, overrides the configuration")]
        port: Option<u16>,
    },
    /// Show the advisory screen in the terminal for a fixed location
    Watch {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
        #[arg(long, help = "Proxy base URL, overrides the configuration")]
        proxy_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = UvAdvisoryConfig::load_from_path(cli.config).map_err(for_user)?;
    init_tracing(&config.logging)?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Watch {
            lat,
            lon,
            proxy_url,
        } => watch(config, &lat, &lon, proxy_url).await,
    }
}

async fn serve(mut config: UvAdvisoryConfig, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let source = OpenWeatherMapClient::new(&config.weather).map_err(for_user)?;
    let state = AppState::new(Arc::new(source));
    web::run(&config.server, state).await
}

async fn watch(
    config: UvAdvisoryConfig,
    lat: &str,
    lon: &str,
    proxy_url: Option<String>,
) -> Result<()> {
    let coordinates =
        Coordinates::parse(lat, lon).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let proxy_url = proxy_url.unwrap_or_else(|| config.client.proxy_url.clone());

    info!(
        "Watching UV index for {} via {}",
        coordinates.format_coordinates(),
        proxy_url
    );
    println!("Commands: t = toggle tips, r = refresh, q = quit\n");

    let platform = Platform::new(
        StaticPermission(PermissionState::Granted),
        FixedLocation::new(coordinates),
        ProxyClient::new(&proxy_url)?,
    );
    let mut controller = Controller::new(
        platform,
        ControllerSettings::from(&config.client),
        TerminalRenderer::new(std::io::stdout()),
    );

    let shutdown = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(16);
    spawn_command_reader(tx, shutdown.clone()).with_context(|| "Failed to start command reader")?;

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        ctrl_c.cancel();
    });

    controller.run(&mut rx, shutdown).await;
    info!("Stopped watching");
    Ok(())
}

/// Lead with the terminal-friendly text when the failure is one of ours,
/// keeping the detail in the cause chain
fn for_user(err: anyhow::Error) -> anyhow::Error {
    let message = err
        .downcast_ref::<UvAdvisoryError>()
        .map(UvAdvisoryError::user_message);
    match message {
        Some(message) => err.context(message),
        None => err,
    }
}
