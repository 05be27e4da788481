use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use etf_picker_core::error::ProxyError;
use serde_json::json;

pub const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch stock data";
pub const RECOMMEND_FAILED_MESSAGE: &str = "Failed to get ETF recommendation";

fn status_for(err: &ProxyError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn report(route: &'static str, err: &ProxyError) {
    if err.is_client_error() {
        tracing::info!(route, kind = err.kind(), error = %err, "rejected request");
    } else {
        sentry::capture_error(err);
        tracing::error!(route, kind = err.kind(), error = %err, "request failed");
    }
}

/// Failure of `GET /search/{keyword}`. The body always carries an empty `results` list.
#[derive(Debug)]
pub struct SearchFailure(pub ProxyError);

impl From<ProxyError> for SearchFailure {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for SearchFailure {
    fn into_response(self) -> Response {
        let err = self.0;
        report("search", &err);
        let status = status_for(&err);
        let body = if err.is_client_error() {
            json!({"error": err.to_string(), "results": []})
        } else {
            json!({
                "error": err.to_string(),
                "results": [],
                "message": SEARCH_FAILED_MESSAGE,
            })
        };
        (status, Json(body)).into_response()
    }
}

/// Failure of `POST /ask-dave`.
#[derive(Debug)]
pub struct RecommendFailure(pub ProxyError);

impl From<ProxyError> for RecommendFailure {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RecommendFailure {
    fn into_response(self) -> Response {
        let err = self.0;
        report("ask_dave", &err);
        let status = status_for(&err);
        let body = if err.is_client_error() {
            json!({"error": err.to_string()})
        } else {
            json!({
                "error": err.to_string(),
                "message": RECOMMEND_FAILED_MESSAGE,
            })
        };
        (status, Json(body)).into_response()
    }
}
