use crate::config::Settings;
use crate::error::ProxyError;
use crate::llm::{Provider, TextGenerator};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url = settings
            .gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(api_key, base_url, model, Duration::from_secs(timeout_secs))
    }

    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_content(
        &self,
        req: GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(&self.api_key)?);

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Gemini response body")?;
        if !status.is_success() {
            anyhow::bail!("Gemini HTTP {status}: {}", error_message(&text));
        }

        serde_json::from_str::<GenerateContentResponse>(&text)
            .with_context(|| format!("failed to parse Gemini response JSON: {}", excerpt(&text)))
    }

    fn response_text(res: &GenerateContentResponse) -> anyhow::Result<String> {
        let candidate = res
            .candidates
            .first()
            .context("Gemini returned no candidates")?;

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            anyhow::bail!(
                "Gemini candidate has no text (finish_reason={})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProxyError> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let res = self
            .generate_content(req)
            .await
            .map_err(|e| ProxyError::GenerationFailed(format!("{e:#}")))?;
        Self::response_text(&res).map_err(|e| ProxyError::GenerationFailed(format!("{e:#}")))
    }
}

// Gemini wraps failures as {"error": {"code", "message", "status"}}.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| excerpt(body))
}

// Bounded prefix of an upstream body; these strings reach API callers.
fn excerpt(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap as AxumHeaders, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            base_url,
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn builds_generate_content_url() {
        let c = client("https://generativelanguage.googleapis.com/".to_string());
        assert_eq!(
            c.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "[{\"ETF Name\""}, {"text": ": \"QQQ\"}]"}], "role": "model"}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(
            GeminiClient::response_text(&res).unwrap(),
            "[{\"ETF Name\": \"QQQ\"}]"
        );
    }

    #[test]
    fn blocked_candidate_is_an_error() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        let err = GeminiClient::response_text(&res).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(GeminiClient::response_text(&empty).is_err());
    }

    #[test]
    fn error_message_prefers_gemini_envelope() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body), "Resource has been exhausted");
        assert_eq!(error_message("plain"), "plain");
    }

    #[test]
    fn excerpt_bounds_long_bodies_on_char_boundaries() {
        let long = "é".repeat(MAX_BODY_EXCERPT_CHARS + 50);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), MAX_BODY_EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn sends_prompt_and_returns_text_verbatim() {
        let app = Router::new().route(
            "/v1beta/models/:model_action",
            post(
                |Path(model_action): Path<String>, headers: AxumHeaders, Json(body): Json<Value>| async move {
                    assert_eq!(model_action, "gemini-1.5-flash:generateContent");
                    assert_eq!(headers.get("x-goog-api-key").unwrap(), "test-key");
                    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap().to_string();
                    assert_eq!(body["contents"][0]["role"], "user");
                    Json(json!({
                        "candidates": [{"content": {"parts": [{"text": format!("echo: {prompt}")}]}}]
                    }))
                },
            ),
        );
        let base = serve(app).await;

        let text = client(base).generate("hello  \n world").await.unwrap();
        assert_eq!(text, "echo: hello  \n world");
    }

    #[tokio::test]
    async fn upstream_error_is_generation_failed() {
        let app = Router::new().route(
            "/v1beta/models/:model_action",
            post(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}})),
                )
            }),
        );
        let base = serve(app).await;

        let err = client(base).generate("prompt").await.unwrap_err();
        match err {
            ProxyError::GenerationFailed(detail) => {
                assert!(detail.contains("403"), "{detail}");
                assert!(detail.contains("API key not valid"), "{detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_generation_failed() {
        let garbage = format!("<html>{}</html>", "x".repeat(5_000));
        let app = Router::new().route(
            "/v1beta/models/:model_action",
            post(move || async move { garbage }),
        );
        let base = serve(app).await;

        let err = client(base).generate("prompt").await.unwrap_err();
        match err {
            ProxyError::GenerationFailed(detail) => {
                assert!(detail.contains("failed to parse Gemini response JSON"), "{detail}");
                assert!(detail.len() < 1_000, "detail not bounded: {} bytes", detail.len());
                assert!(!detail.contains("</html>"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
