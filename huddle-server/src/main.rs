use axum::http::HeaderValue;
use huddle_server::{RelayService, ServerConfig, app};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

const STATS_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = ServerConfig::from_env();
    info!("Initializing signaling relay...");

    let relay = RelayService::new();

    let stats_relay = relay.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let stats = stats_relay.stats().await;
            info!(
                "Active rooms: {}, active clients: {}",
                stats.rooms, stats.clients
            );
        }
    });

    let origin = config
        .client_url
        .parse::<HeaderValue>()
        .expect("CLIENT_URL is not a valid origin");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = app(relay).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Signaling relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
