//! Environment-backed configuration.
//!
//! Everything is read once at startup into an explicit [`Config`] value that
//! is threaded through constructors; nothing consults process state after
//! that, so tests can build isolated instances from plain lookups.

use core::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Placeholder OAuth client id, matching an unconfigured deployment.
const DEFAULT_CLIENT_ID: &str = "your-ynab-client-id";
/// Placeholder OAuth client secret.
const DEFAULT_CLIENT_SECRET: &str = "your-ynab-client-secret";
/// Default base callback URL for the hosting framework's OAuth flow.
const DEFAULT_CALLBACK_URL: &str = "http://localhost:8000";
/// Default versioned YNAB REST base path.
const DEFAULT_API_BASE_URL: &str = "https://api.ynab.com/v1";
/// Default outbound request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default retry budget. Parsed and logged but never consumed: failures are
/// surfaced to the caller rather than retried.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// A sensitive string that is redacted in `Debug` output.
#[derive(Clone)]
pub(crate) struct Secret(String);

impl Secret {
    /// Wraps a sensitive value.
    pub(crate) const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the wrapped value for the few places that genuinely need it.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Secret").field(&"********").finish()
    }
}

/// Runtime configuration, assembled from environment variables with
/// documented defaults.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// OAuth client id registered with YNAB (`YNAB_CLIENT_ID`).
    pub(crate) client_id: String,
    /// OAuth client secret (`YNAB_CLIENT_SECRET`), redacted in Debug output.
    pub(crate) client_secret: Secret,
    /// Base callback URL for the hosting framework's OAuth flow
    /// (`YNAB_BASE_URL`).
    pub(crate) callback_url: Url,
    /// Whether to request only the read-only upstream scope
    /// (`YNAB_READ_ONLY`).
    pub(crate) read_only: bool,
    /// Versioned REST base path (`YNAB_API_BASE_URL`), normalized to end
    /// with a trailing slash so endpoint segments can be appended.
    pub(crate) api_base_url: Url,
    /// Personal access token used as the bearer credential
    /// (`YNAB_ACCESS_TOKEN`). When unset, every tool reports the uniform
    /// no-credential error instead of calling upstream.
    pub(crate) access_token: Option<String>,
    /// Outbound API request timeout (`YNAB_REQUEST_TIMEOUT`, seconds).
    pub(crate) request_timeout: Duration,
    /// Reserved retry budget (`YNAB_MAX_RETRIES`). Never consumed: rate
    /// limits and failures must stay visible to the caller.
    pub(crate) max_retries: u32,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an unparseable value.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an unparseable value.
    pub(crate) fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup("YNAB_CLIENT_ID").unwrap_or_else(|| DEFAULT_CLIENT_ID.to_owned());
        let client_secret = Secret::new(
            lookup("YNAB_CLIENT_SECRET").unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_owned()),
        );
        let callback_raw =
            lookup("YNAB_BASE_URL").unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_owned());
        let callback_url = parse_url("YNAB_BASE_URL", &callback_raw, false)?;
        let read_only = parse_bool("YNAB_READ_ONLY", lookup("YNAB_READ_ONLY"))?;
        let api_raw =
            lookup("YNAB_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = parse_url("YNAB_API_BASE_URL", &api_raw, true)?;
        let access_token = lookup("YNAB_ACCESS_TOKEN").filter(|token| !token.trim().is_empty());
        let timeout_secs = parse_number(
            "YNAB_REQUEST_TIMEOUT",
            lookup("YNAB_REQUEST_TIMEOUT"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let max_retries = parse_number(
            "YNAB_MAX_RETRIES",
            lookup("YNAB_MAX_RETRIES"),
            DEFAULT_MAX_RETRIES,
        )?;

        Ok(Self {
            client_id,
            client_secret,
            callback_url,
            read_only,
            api_base_url,
            access_token,
            request_timeout: Duration::from_secs(timeout_secs),
            max_retries,
        })
    }

    /// True when the OAuth client credentials still hold their placeholder
    /// defaults, meaning the hosting framework's OAuth flow cannot complete.
    pub(crate) fn oauth_placeholders(&self) -> bool {
        self.client_id == DEFAULT_CLIENT_ID
            || self.client_secret.expose() == DEFAULT_CLIENT_SECRET
    }
}

/// Error produced when an environment variable holds an unusable value.
#[derive(Debug, Error)]
#[error("invalid value '{value}' for {name}: {reason}")]
pub(crate) struct ConfigError {
    /// Variable name.
    name: &'static str,
    /// Rejected value.
    value: String,
    /// Why it was rejected.
    reason: String,
}

impl ConfigError {
    /// Creates a config error for `name` with the rejected `value`.
    fn new(name: &'static str, value: &str, reason: &str) -> Self {
        Self {
            name,
            value: value.to_owned(),
            reason: reason.to_owned(),
        }
    }
}

/// Parses a boolean variable. Unset means `false`; accepted spellings are
/// `1`/`true`/`yes` and `0`/`false`/`no`, case-insensitive.
fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::new(name, &raw, "expected a boolean")),
    }
}

/// Parses an integer variable, falling back to `default` when unset.
fn parse_number<N>(
    name: &'static str,
    value: Option<String>,
    default: N,
) -> Result<N, ConfigError>
where
    N: core::str::FromStr,
    N::Err: core::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<N>()
            .map_err(|err| ConfigError::new(name, &raw, &err.to_string()))
    })
}

/// Parses a URL variable. When `as_base` is set the URL is normalized to end
/// with a trailing slash and must be able to carry path segments.
fn parse_url(name: &'static str, raw: &str, as_base: bool) -> Result<Url, ConfigError> {
    let mut text = raw.trim().to_owned();
    if as_base && !text.ends_with('/') {
        text.push('/');
    }
    let url = Url::parse(&text).map_err(|err| ConfigError::new(name, raw, &err.to_string()))?;
    if as_base && url.cannot_be_a_base() {
        return Err(ConfigError::new(name, raw, "URL cannot carry a path"));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect and Debug formatting for readability"
)]
mod tests {
    use super::Config;

    fn lookup_from(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|entry| entry.0 == name)
                .map(|entry| entry.1.to_owned())
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_vars(|_name| None).expect("defaults should parse");
        assert_eq!(config.client_id, "your-ynab-client-id");
        assert_eq!(config.api_base_url.as_str(), "https://api.ynab.com/v1/");
        assert_eq!(config.callback_url.as_str(), "http://localhost:8000/");
        assert!(!config.read_only);
        assert!(config.access_token.is_none());
        assert_eq!(config.request_timeout.as_secs(), 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.oauth_placeholders());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let lookup = lookup_from(&[
            ("YNAB_CLIENT_ID", "real-client"),
            ("YNAB_CLIENT_SECRET", "s3cret"),
            ("YNAB_READ_ONLY", "true"),
            ("YNAB_API_BASE_URL", "https://api.example.test/v9"),
            ("YNAB_ACCESS_TOKEN", "token-123"),
            ("YNAB_REQUEST_TIMEOUT", "5"),
            ("YNAB_MAX_RETRIES", "0"),
        ]);
        let config = Config::from_vars(lookup).expect("values should parse");
        assert_eq!(config.client_id, "real-client");
        assert!(config.read_only);
        assert_eq!(config.api_base_url.as_str(), "https://api.example.test/v9/");
        assert_eq!(config.access_token.as_deref(), Some("token-123"));
        assert_eq!(config.request_timeout.as_secs(), 5);
        assert_eq!(config.max_retries, 0);
        assert!(!config.oauth_placeholders());
    }

    #[test]
    fn blank_access_token_counts_as_unset() {
        let lookup = lookup_from(&[("YNAB_ACCESS_TOKEN", "   ")]);
        let config = Config::from_vars(lookup).expect("should parse");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let lookup = lookup_from(&[("YNAB_READ_ONLY", "sometimes")]);
        let err = Config::from_vars(lookup).expect_err("boolean should be rejected");
        let message = err.to_string();
        assert!(message.contains("YNAB_READ_ONLY"));
        assert!(message.contains("sometimes"));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let lookup = lookup_from(&[("YNAB_REQUEST_TIMEOUT", "soon")]);
        let err = Config::from_vars(lookup).expect_err("number should be rejected");
        assert!(err.to_string().contains("YNAB_REQUEST_TIMEOUT"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let lookup = lookup_from(&[("YNAB_API_BASE_URL", "not a url")]);
        let err = Config::from_vars(lookup).expect_err("url should be rejected");
        assert!(err.to_string().contains("YNAB_API_BASE_URL"));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let lookup = lookup_from(&[("YNAB_CLIENT_SECRET", "hunter2")]);
        let config = Config::from_vars(lookup).expect("should parse");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("********"));
    }
}
