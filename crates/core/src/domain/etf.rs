use serde::{Deserialize, Serialize};

/// A fund that can be recommended. Carried for API consumers; not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Etf {
    pub symbol: String,
    pub name: String,
}

impl Etf {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "symbol": self.symbol,
            "name": self.name,
        })
    }
}
