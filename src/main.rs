use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use linkhub::config::Config;
use linkhub::media::MediaRelocation;
use linkhub::middleware::auth::SessionSettings;
use linkhub::router::{LinkHubState, linkhub_router};
use linkhub::service::{AdminAuth, ApiKey};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Read the log level before validation so config warnings are printed.
    let loglevel = std::env::var("LINKHUB_LOGLEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let cfg = Config::load()?;
    info!(
        listen_addr = %cfg.listen_addr,
        database_url = %cfg.database_url,
        media_backend = ?cfg.media.backend,
        loglevel = %cfg.loglevel,
    );

    let store = linkhub::db::connect(&cfg.database_url).await?;
    store.init_schema().await?;

    let media = MediaRelocation::from_config(&cfg.media)?;
    let admin = AdminAuth::new(&cfg.admin_password)?;
    let state = LinkHubState::new(
        store,
        media,
        admin,
        ApiKey::new(cfg.api_secret.clone()),
        SessionSettings::from_config(&cfg),
        cfg.cookie_key()?,
    );
    let app = linkhub_router(state, &cfg);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
