use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, StatusCode,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use etf_picker_core::domain::recommendation::{RecommendationRequest, RecommendationResponse};
use etf_picker_core::error::ProxyError;
use etf_picker_core::llm::{prompt, TextGenerator};
use etf_picker_core::search::TickerSearch;

use crate::error::{RecommendFailure, SearchFailure};

pub const NO_TICKERS_MESSAGE: &str = "No tickers provided";

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn TickerSearch>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub db: Option<PgPool>,
}

/// ETF routes are mounted under `prefix` (`""` mounts them at the root); `/health` is never prefixed.
pub fn router(state: AppState, prefix: &str) -> Router {
    let etfs = Router::new()
        .route("/", get(list_etfs))
        .route(
            "/search/:keyword",
            get(search_stocks).options(search_preflight),
        )
        .route(
            "/ask-dave",
            post(ask_dave)
                .options(ask_dave_preflight)
                .get(ask_dave_details),
        )
        .route("/:symbol", get(get_etf));

    let app = Router::new().route("/health", get(health));
    let app = if prefix.is_empty() {
        app.merge(etfs)
    } else {
        app.nest(prefix, etfs)
    };

    app.fallback(not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}

async fn list_etfs() -> Json<Value> {
    Json(json!({"message": "ETFs list endpoint"}))
}

async fn get_etf(Path(symbol): Path<String>) -> Json<Value> {
    etf_details(&symbol)
}

// GET on the recommendation path is just another symbol lookup.
async fn ask_dave_details() -> Json<Value> {
    etf_details("ask-dave")
}

fn etf_details(symbol: &str) -> Json<Value> {
    Json(json!({"message": format!("ETF details for {symbol}")}))
}

fn preflight(methods: &'static str) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_METHODS, methods),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

async fn search_preflight() -> impl IntoResponse {
    preflight("GET, OPTIONS")
}

async fn ask_dave_preflight() -> impl IntoResponse {
    preflight("POST, OPTIONS")
}

async fn search_stocks(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<Json<Value>, SearchFailure> {
    tracing::debug!(%keyword, provider = state.search.provider_name(), "searching tickers");
    let results = state.search.search(&keyword).await?;
    Ok(Json(results))
}

async fn ask_dave(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RecommendationResponse>, RecommendFailure> {
    let request = RecommendationRequest::from_slice(&body)?;
    if !request.has_tickers() {
        return Err(ProxyError::InvalidInput(NO_TICKERS_MESSAGE.to_string()).into());
    }

    let symbols = request.symbols()?;

    let generator = state.generator.as_ref().ok_or_else(|| {
        ProxyError::GenerationFailed("GEMINI_API_KEY is not configured".to_string())
    })?;

    let prompt = prompt::build_recommendation_prompt(&symbols);
    tracing::info!(
        tickers_len = symbols.len(),
        provider = ?generator.provider(),
        "requesting ETF recommendation"
    );

    let recommendation = generator.generate(&prompt).await?;
    Ok(Json(RecommendationResponse { recommendation }))
}
