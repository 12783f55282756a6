//! Backend endpoint configuration.

/// Env var naming the backend base URL.
pub const BASE_URL_ENV: &str = "HORIZON_API_URL";

/// Default used when the env var is unset (local dev backend).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL with any trailing slash stripped, so endpoint
    /// paths can be appended verbatim.
    pub base_url: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let config = Config::with_base_url("http://localhost:8000/");
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_multiple_trailing_slashes_stripped() {
        let config = Config::with_base_url("https://api.example.com//");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let config = Config::with_base_url("  http://localhost:8000 ");
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_clean_url_unchanged() {
        let config = Config::with_base_url("http://localhost:8000");
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
