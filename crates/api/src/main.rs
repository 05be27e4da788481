use clap::Parser;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etf_picker_core::config::{normalize_prefix, Settings};
use etf_picker_core::llm::gemini::GeminiClient;
use etf_picker_core::llm::TextGenerator;
use etf_picker_core::search::provider::HttpTickerSearch;

mod error;
mod routes;

#[derive(Debug, Parser)]
#[command(name = "etf_picker_api")]
struct Args {
    /// Port to listen on. Overrides PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Route prefix for the ETF endpoints. Overrides API_PREFIX.
    #[arg(long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let search = HttpTickerSearch::from_settings(&settings)?;

    let generator: Option<Arc<dyn TextGenerator>> = match GeminiClient::from_settings(&settings) {
        Ok(client) => {
            tracing::info!(model = client.model(), "generation client ready");
            Some(Arc::new(client) as Arc<dyn TextGenerator>)
        }
        Err(e) => {
            tracing::error!(error = %e, "generation client unavailable; /ask-dave will fail");
            None
        }
    };

    let db = connect_db(&settings).await;

    let state = routes::AppState {
        search: Arc::new(search),
        generator,
        db,
    };
    tracing::info!(db_connected = state.db.is_some(), "state initialized");

    let prefix = args
        .prefix
        .as_deref()
        .map(normalize_prefix)
        .unwrap_or_else(|| settings.api_prefix());
    let app = routes::router(state, &prefix);

    let port = args.port.unwrap_or_else(|| settings.port());
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, %prefix, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// The database is optional; without it the API runs in degraded mode.
async fn connect_db(settings: &Settings) -> Option<PgPool> {
    if settings.database_url.is_none() {
        tracing::warn!("DATABASE_URL missing; starting API without a database");
        return None;
    }

    let pool = match etf_picker_core::storage::connect(settings).await {
        Ok(pool) => pool,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "db connect failed; starting API in degraded mode");
            return None;
        }
    };

    match etf_picker_core::storage::ping(&pool).await {
        Ok(()) => Some(pool),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "db ping failed; starting API in degraded mode");
            None
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
