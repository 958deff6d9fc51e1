use palco_client::ClientConfig;

/// Configuration for the board front-end
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Marketplace API base URL
    pub base_url: String,
    /// Bearer token for authenticated calls
    pub token: Option<String>,
    /// Company whose stage registry drives the board
    pub company_id: i64,
    /// Request timeout in seconds
    pub timeout: u64,
    /// UI tick interval in milliseconds
    pub tick_ms: u64,
}

impl BoardConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PALCO_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            token: std::env::var("PALCO_TOKEN").ok().filter(|t| !t.is_empty()),
            company_id: std::env::var("PALCO_COMPANY_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            timeout: std::env::var("PALCO_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            tick_ms: std::env::var("PALCO_TICK_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }

    /// Create a config with custom overrides
    pub fn with_overrides(base_url: impl Into<String>, company_id: i64) -> Self {
        let mut config = Self::from_env();
        config.base_url = base_url.into();
        config.company_id = company_id;
        config
    }

    /// Client configuration derived from this board configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.clone()).with_timeout(self.timeout);
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
