/// Production API used when nothing else is configured.
const DEFAULT_BASE_URL: &str = "https://pet-manager-api.geia.vip";

/// Environment variable consulted by [`ApiConfig::from_env`].
const BASE_URL_ENV: &str = "PET_MANAGER_API_URL";

/// Connection settings for the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Points the client at an explicit base URL. Trailing slashes are
    /// trimmed so endpoint joining stays canonical.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Reads the base URL from the environment, falling back to the
    /// built-in production address.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}
