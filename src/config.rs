use std::time::Duration;

/// Placeholder image returned when the primary backend cannot complete.
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://picsum.photos/512/512";

/// Configuration for the edit-session workflow.
///
/// Use [`StudioConfig::builder()`] for ergonomic construction,
/// [`StudioConfig::default()`] for local development values, or
/// [`StudioConfig::from_env()`] to pick up deployment settings.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Base URL of the edit backend (e.g. "http://localhost:5000").
    pub endpoint: String,

    /// Base URL of an OpenAI-compatible chat completions service.
    pub polish_endpoint: String,

    /// Bearer token for the polish service. `None` disables remote polishing.
    pub polish_api_key: Option<String>,

    /// Model used for prompt polishing.
    pub polish_model: String,

    /// Timeout applied to every remote call.
    pub request_timeout: Duration,

    /// Simulated latency before a degraded generation result is returned.
    pub fallback_delay: Duration,

    /// Image url handed out by degraded generations.
    pub placeholder_url: String,

    /// Simulated latency of a best-effort publish.
    pub share_fallback_delay: Duration,

    /// Owner forwarded to the backend when a session is created.
    pub user_id: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            polish_endpoint: "https://openrouter.ai/api/v1".to_string(),
            polish_api_key: None,
            polish_model: "google/gemini-2.5-flash".to_string(),
            request_timeout: Duration::from_secs(30),
            fallback_delay: Duration::from_secs(3),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            share_fallback_delay: Duration::from_millis(500),
            user_id: None,
        }
    }
}

impl StudioConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::default()
    }

    /// Defaults overlaid with `EDIT_SESSION_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(endpoint) = lookup("EDIT_SESSION_ENDPOINT") {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(endpoint) = lookup("EDIT_SESSION_POLISH_ENDPOINT") {
            builder = builder.with_polish_endpoint(endpoint);
        }
        if let Some(key) = lookup("EDIT_SESSION_POLISH_API_KEY").filter(|k| !k.is_empty()) {
            builder = builder.with_polish_api_key(key);
        }
        if let Some(model) = lookup("EDIT_SESSION_POLISH_MODEL") {
            builder = builder.with_polish_model(model);
        }
        if let Some(secs) = lookup("EDIT_SESSION_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            builder = builder.with_request_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Builder for [`StudioConfig`].
#[derive(Default)]
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = normalize(endpoint.into());
        self
    }

    pub fn with_polish_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.polish_endpoint = normalize(endpoint.into());
        self
    }

    pub fn with_polish_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.polish_api_key = Some(key.into());
        self
    }

    pub fn with_polish_model(mut self, model: impl Into<String>) -> Self {
        self.config.polish_model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.config.fallback_delay = delay;
        self
    }

    pub fn with_placeholder_url(mut self, url: impl Into<String>) -> Self {
        self.config.placeholder_url = url.into();
        self
    }

    pub fn with_share_fallback_delay(mut self, delay: Duration) -> Self {
        self.config.share_fallback_delay = delay;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.config.user_id = Some(user_id.into());
        self
    }

    /// Build the final [`StudioConfig`].
    pub fn build(self) -> StudioConfig {
        self.config
    }
}
