//! Client configuration.
//!
//! A [`ClientConfig`] is built once, handed to the client, and never mutated
//! afterwards. Every setter writes exactly one field, so when the same field
//! is set twice the later call wins.

use std::time::Duration;

/// Default API root, including the version segment.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("gpt-client/", env!("CARGO_PKG_VERSION"));

/// Default wall-clock budget for a whole request, body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Per-client configuration.
///
/// # Example
/// ```rust
/// use gpt_client::options::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("sk-...")
///     .with_org("org-123")
///     .with_timeout(Duration::from_secs(10))
///     .with_timeout(Duration::from_secs(60));
///
/// assert_eq!(config.timeout, Duration::from_secs(60));
/// assert_eq!(config.organization.as_deref(), Some("org-123"));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token sent in the `Authorization` header
    pub api_key: SecretString,

    /// API root every endpoint path is appended to
    pub base_url: String,

    /// Value of the `OpenAI-Organization` header; omitted when empty
    pub organization: Option<String>,

    /// Engine used by `completion` and `search` when none is given
    pub default_engine: String,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Budget for one request, from connect until the body is fully read
    pub timeout: Duration,

    /// Underlying HTTP client; a fresh one is built when absent
    pub http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// Create a configuration with the documented defaults.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            default_engine: crate::model::DEFAULT_ENGINE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http_client: None,
        }
    }

    /// Override the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the organization id.
    pub fn with_org(mut self, id: impl Into<String>) -> Self {
        self.organization = Some(id.into());
        self
    }

    /// Override the default engine.
    pub fn with_default_engine(mut self, engine: impl Into<String>) -> Self {
        self.default_engine = engine.into();
        self
    }

    /// Override the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a caller-supplied HTTP client.
    ///
    /// The configured timeout is still applied to every request.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Organization id, if one is set and non-empty.
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref().filter(|id| !id.is_empty())
    }
}
