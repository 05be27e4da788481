use crate::error::ProxyError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A ticker as typed by the user. Never checked against a real listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerEntry {
    pub symbol: TickerSymbol,
}

/// Body of `POST /ask-dave`.
///
/// `tickers` is kept as raw JSON: absent, `null`, `false`, `0`, `""`, `[]` and `{}`
/// all mean "no tickers". Any other value must be an array of `{symbol}` objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub tickers: Value,
}

impl RecommendationRequest {
    /// Parses a request body. A blank body reads as a request without tickers.
    pub fn from_slice(body: &[u8]) -> Result<Self, ProxyError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value = serde_json::from_slice::<Value>(body)
            .map_err(|e| ProxyError::Unexpected(format!("invalid request body: {e}")))?;
        if !value.is_object() {
            return Err(ProxyError::Unexpected(
                "invalid request body: expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ProxyError::Unexpected(format!("invalid request body: {e}")))
    }

    pub fn has_tickers(&self) -> bool {
        is_truthy(&self.tickers)
    }

    /// Symbols in submission order, duplicates kept. Empty when `has_tickers` is false.
    pub fn symbols(&self) -> Result<Vec<TickerSymbol>, ProxyError> {
        if !self.has_tickers() {
            return Ok(Vec::new());
        }

        let Value::Array(entries) = &self.tickers else {
            return Err(ProxyError::Unexpected(
                "invalid tickers: expected a list of {symbol} objects".to_string(),
            ));
        };

        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                serde_json::from_value::<TickerEntry>(entry.clone())
                    .map(|e| e.symbol)
                    .map_err(|e| ProxyError::Unexpected(format!("invalid ticker at index {idx}: {e}")))
            })
            .collect()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
}
