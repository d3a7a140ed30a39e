//! Runtime configuration, read from the environment.

use std::env::VarError;
use std::fmt;

/// Holds the YouTube Data API key.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Overrides the YouTube Data API base URL.
pub const API_BASE_VAR: &str = "TUBEVIEW_API_BASE";

/// A `tracing` filter directive, as understood by `EnvFilter`.
pub const LOG_VAR: &str = "TUBEVIEW_LOG";

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: Option<String>,
    api_base: String,
    log_directive: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("log_directive", &self.log_directive)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            log_directive: DEFAULT_LOG_DIRECTIVE.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// A missing API key is not an error here, since not every command talks to YouTube; see
    /// [`Config::api_key`].
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e @ VarError::NotUnicode(_)) => Err(e.into()),
        })
    }

    /// Builds a configuration from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> eyre::Result<Self>
    where
        F: Fn(&str) -> eyre::Result<Option<String>>,
    {
        let read = |name: &str| -> eyre::Result<Option<String>> {
            let value = lookup(name).map_err(|e| e.wrap_err(format!("read ${name}")))?;
            Ok(value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()))
        };

        let api_base = match read(API_BASE_VAR)? {
            Some(base) if base.starts_with("http://") || base.starts_with("https://") => {
                base.trim_end_matches('/').to_string()
            }
            Some(base) => eyre::bail!("${API_BASE_VAR} must be an http(s) URL, got '{base}'"),
            None => DEFAULT_API_BASE.to_string(),
        };

        Ok(Self {
            api_key: read(API_KEY_VAR)?,
            api_base,
            log_directive: read(LOG_VAR)?.unwrap_or_else(|| DEFAULT_LOG_DIRECTIVE.to_string()),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// The YouTube Data API key, or an error explaining how to provide one.
    pub fn api_key(&self) -> eyre::Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            eyre::eyre!(
                "no YouTube Data API key configured; set ${API_KEY_VAR} to a key \
                 created in the Google Cloud console"
            )
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn log_directive(&self) -> &str {
        &self.log_directive
    }
}
