use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use serveease::config::AppConfig;
use serveease::db;
use serveease::routes;
use serveease::services::gateway::SimulatedGateway;
use serveease::services::identity::DirectoryIdentityProvider;
use serveease::services::inflight::InFlight;
use serveease::services::location::UnavailableGeolocator;
use serveease::services::otp::{LogOtpSender, OtpStore};
use serveease::services::session::SessionStore;
use serveease::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.otp_secret == "changeme" {
        tracing::warn!("OTP_SECRET is not set, using the built-in development secret");
    }
    if config.demo_mode {
        tracing::info!("demo login enabled");
    }

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let state = Arc::new(AppState {
        db: Arc::clone(&db),
        identity: Box::new(DirectoryIdentityProvider::new(db)),
        otp_sender: Box::new(LogOtpSender),
        gateway: Box::new(SimulatedGateway::new(config.confirm_delay())),
        geolocator: Box::new(UnavailableGeolocator),
        sessions: Mutex::new(SessionStore::new()),
        otps: Mutex::new(OtpStore::new()),
        in_flight: InFlight::new(),
        config: config.clone(),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
