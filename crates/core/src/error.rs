/// Failure taxonomy shared by the upstream clients and the HTTP layer.
///
/// Each variant carries a human-readable description that ends up in the
/// `error` field of the JSON body returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    GenerationFailed(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ProxyError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::InvalidInput(_) => "invalid_input",
            ProxyError::UpstreamUnavailable(_) => "upstream_unavailable",
            ProxyError::GenerationFailed(_) => "generation_failed",
            ProxyError::Unexpected(_) => "unexpected",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ProxyError::InvalidInput(_))
    }
}
