mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use songport_catalog::{Converter, SpotifyCredentials};
use songport_config::{
    load_config, resolve_default_country, resolve_port, resolve_spotify_credentials,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::server::{ServerState, router};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_COUNTRY: &str = "US";

#[derive(Debug, Parser)]
#[command(name = "songport")]
#[command(version, about = "Cross-catalog streaming link converter", long_about = None)]
struct Cli {
    /// Port to listen on; overrides PORT and the config file.
    #[arg(long)]
    port: Option<u16>,
    /// Default storefront country applied when a request carries none.
    #[arg(long)]
    country: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let credentials = resolve_spotify_credentials(&config).map(|(client_id, client_secret)| {
        SpotifyCredentials {
            client_id,
            client_secret,
        }
    });
    if credentials.is_none() {
        warn!(
            "spotify credentials are not configured; conversions will fail until \
             SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are set"
        );
    }

    let port = cli.port.or_else(|| resolve_port(&config)).unwrap_or(DEFAULT_PORT);
    let default_country = cli
        .country
        .or_else(|| resolve_default_country(&config))
        .unwrap_or_else(|| DEFAULT_REQUEST_COUNTRY.to_string());

    let converter = Arc::new(Converter::new(credentials));

    // Warm the token cache ahead of the first request; a failure here is only
    // a warning since auth is retried lazily.
    let warm = converter.clone();
    tokio::spawn(async move {
        if let Err(err) = warm.warm_token().await {
            warn!(%err, "initial spotify token fetch failed");
        }
    });

    let state = ServerState {
        converter,
        default_country,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(%addr, "songport listening");
    if let Err(err) = axum::serve(listener, router(state)).await {
        error!(%err, "server error");
        std::process::exit(1);
    }
}
