use std::time::Duration;

/// Default OpenF1 endpoint root
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";
pub const DEFAULT_USER_AGENT: &str = "F1-StrategyBot/2025";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "OF1_BASE";

/// OpenF1 client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum spacing between two outbound requests
    pub min_request_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_secs(1),
        }
    }
}

impl GatewayConfig {
    /// Defaults, with the base URL taken from `OF1_BASE` when set
    pub fn from_env() -> Self {
        Self::default().with_base_url_opt(std::env::var(BASE_URL_ENV).ok())
    }

    fn with_base_url_opt(self, base_url: Option<String>) -> Self {
        match base_url.map(|s| s.trim().to_string()) {
            Some(url) if !url.is_empty() => self.with_base_url(url),
            _ => self,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}
