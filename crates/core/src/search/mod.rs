pub mod provider;

use crate::error::ProxyError;
use serde_json::Value;

/// Keyword lookup against an external ticker directory.
#[async_trait::async_trait]
pub trait TickerSearch: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Returns the upstream JSON body untouched.
    async fn search(&self, keyword: &str) -> Result<Value, ProxyError>;
}
