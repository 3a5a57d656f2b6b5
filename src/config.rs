//! Client configuration: API endpoints, the durable store location, and the
//! request timeout. Compiled defaults come from build-time environment
//! variables; the CLI applies runtime overrides on top so a deployed binary can
//! point at another API without rebuilding. Configuration values are public; do
//! not store secrets here.

use crate::errors::AppError;
use std::path::PathBuf;
use url::Url;

/// Default API base when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Default request timeout (milliseconds) applied to all HTTP helpers.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default file name of the persisted session store.
pub const DEFAULT_STORE_FILE: &str = "lingodesk-session.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub request_timeout_ms: u64,
    pub login_path: String,
    pub register_path: String,
    pub me_path: String,
    pub logout_path: String,
}

impl AppConfig {
    /// Loads config from build-time environment variables.
    #[must_use]
    pub fn load() -> Self {
        let api_base_url = option_env!("LINGODESK_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL);
        let storage_path = option_env!("LINGODESK_STORE_PATH").map_or_else(default_store_path, PathBuf::from);

        Self {
            api_base_url: api_base_url.to_string(),
            storage_path,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            login_path: "/auth/login".to_string(),
            register_path: "/auth/register".to_string(),
            me_path: "/auth/me".to_string(),
            logout_path: "/auth/logout".to_string(),
        }
    }

    /// Builds a config pointing at `api_base_url` with every other value defaulted.
    #[must_use]
    pub fn with_api_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::load()
        }
    }

    /// Checks that the API base is an absolute http(s) URL.
    ///
    /// # Errors
    /// Returns `AppError::Config` when the base URL is missing or malformed.
    pub fn validate(&self) -> Result<(), AppError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(AppError::Config("API base URL is not configured.".to_string()));
        }
        let url = Url::parse(base)
            .map_err(|err| AppError::Config(format!("Invalid API base URL {base}: {err}")))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::Config(format!(
                "Unsupported API base URL scheme: {scheme}"
            ))),
        }
    }

    /// Joins the API base with an endpoint path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.api_base_url, path)
    }
}

/// Runtime values that override the compiled defaults when present.
#[derive(Debug, Default)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub storage_path: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl RuntimeConfig {
    /// Builds overrides from raw values, discarding blank strings and a zero timeout.
    #[must_use]
    pub fn new(
        api_base_url: Option<&str>,
        storage_path: Option<&str>,
        request_timeout_ms: Option<u64>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.and_then(normalize_runtime_value),
            storage_path: storage_path.and_then(normalize_runtime_value),
            request_timeout_ms: request_timeout_ms.filter(|value| *value > 0),
        }
    }
}

pub fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.storage_path {
        config.storage_path = PathBuf::from(value);
    }
    if let Some(value) = runtime.request_timeout_ms {
        config.request_timeout_ms = value;
    }
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".lingodesk")
        .join(DEFAULT_STORE_FILE)
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_runtime_value_trims_and_rejects_empty() {
        assert_eq!(normalize_runtime_value(""), None);
        assert_eq!(normalize_runtime_value("   "), None);
        assert_eq!(
            normalize_runtime_value("  https://api.lingodesk.dev "),
            Some("https://api.lingodesk.dev".to_string())
        );
    }

    #[test]
    fn apply_runtime_overrides_ignores_empty_values() {
        let mut config = AppConfig::with_api_base_url("https://api.default");
        let original_path = config.storage_path.clone();
        let runtime = RuntimeConfig::new(Some("  "), Some(""), Some(0));

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.default");
        assert_eq!(config.storage_path, original_path);
        assert_eq!(config.request_timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn apply_runtime_overrides_overwrites_when_present() {
        let mut config = AppConfig::with_api_base_url("https://api.default");
        let runtime = RuntimeConfig::new(
            Some("https://api.override"),
            Some("/tmp/lingodesk/store.json"),
            Some(2_500),
        );

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/lingodesk/store.json"));
        assert_eq!(config.request_timeout_ms, 2_500);
    }

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        let config = AppConfig::with_api_base_url("https://api.lingodesk.dev/api/");
        assert_eq!(
            config.endpoint("/auth/login"),
            "https://api.lingodesk.dev/api/auth/login"
        );
        assert_eq!(
            config.endpoint("auth/me"),
            "https://api.lingodesk.dev/api/auth/me"
        );
        assert_eq!(build_url_with_base("", "/auth/me"), "/auth/me");
    }

    #[test]
    fn validate_rejects_blank_and_non_http_bases() {
        assert!(AppConfig::with_api_base_url("").validate().is_err());
        assert!(AppConfig::with_api_base_url("ftp://files.example").validate().is_err());
        assert!(AppConfig::with_api_base_url("not a url").validate().is_err());
        assert!(AppConfig::with_api_base_url("https://api.lingodesk.dev").validate().is_ok());
    }
}
