pub mod domain;
pub mod error;
pub mod llm;
pub mod search;
pub mod storage;

pub mod config {
    use anyhow::Context;

    const DEFAULT_API_PREFIX: &str = "/etfs";
    const DEFAULT_PORT: u16 = 5000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub gemini_api_key: Option<String>,
        pub gemini_model: Option<String>,
        pub gemini_base_url: Option<String>,
        pub ticker_search_base_url: Option<String>,
        pub api_prefix: Option<String>,
        pub port: Option<u16>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = match std::env::var("PORT") {
                Ok(v) => Some(
                    v.parse::<u16>()
                        .with_context(|| format!("PORT must be a port number (got {v:?})"))?,
                ),
                Err(_) => None,
            };

            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                gemini_api_key: non_empty_var("GEMINI_API_KEY"),
                gemini_model: non_empty_var("GEMINI_MODEL"),
                gemini_base_url: non_empty_var("GEMINI_BASE_URL"),
                ticker_search_base_url: non_empty_var("TICKER_SEARCH_BASE_URL"),
                api_prefix: std::env::var("API_PREFIX").ok(),
                port,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }

        /// Route prefix normalized to either `""` or `/segment` without a trailing slash.
        pub fn api_prefix(&self) -> String {
            normalize_prefix(self.api_prefix.as_deref().unwrap_or(DEFAULT_API_PREFIX))
        }

        pub fn port(&self) -> u16 {
            self.port.unwrap_or(DEFAULT_PORT)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    pub fn normalize_prefix(raw: &str) -> String {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }

}
