//! Mock session configuration.
//!
//! Loaded from YAML or JSON, or from the environment:
//!
//! ```yaml
//! baseUrl: http://localhost:8080
//! debug: true
//! noMatch:
//!   respond:
//!     status: 404
//!     body: no stub
//! ```

use crate::error::MockError;
use crate::request::UrlParts;
use crate::response::MockResponse;
use serde::Deserialize;

/// Environment variable enabling the debugger at session start (`1`/`true`).
pub const DEBUG_ENV: &str = "RIFT_MOCK_DEBUG";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "RIFT_MOCK_BASE_URL";

/// What `execute` does when no rule matches.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum NoMatchPolicy {
    /// Return `MockError::NoMatchingRule`
    #[default]
    Fail,
    /// Return this response instead
    Respond(MockResponse),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MockConfig {
    /// Origin used to resolve relative rule and request URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Initial debugger state
    #[serde(default)]
    pub debug: bool,

    /// `fail`, or `respond: {...}` as a single-key map
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub no_match: NoMatchPolicy,
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debug: false,
            no_match: NoMatchPolicy::default(),
        }
    }
}

impl MockConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MockError> {
        let config: MockConfig =
            serde_yaml::from_str(yaml).map_err(|e| MockError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MockError> {
        let config: MockConfig =
            serde_json::from_str(json).map_err(|e| MockError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `RIFT_MOCK_DEBUG` and `RIFT_MOCK_BASE_URL`.
    pub fn from_env() -> Result<Self, MockError> {
        let mut config = MockConfig::default();
        if let Ok(value) = std::env::var(DEBUG_ENV) {
            config.debug = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    /// The base URL must be absolute.
    pub fn base(&self) -> Result<UrlParts, MockError> {
        let base = UrlParts::parse(&self.base_url)?;
        if !base.is_absolute() {
            return Err(MockError::InvalidConfig(format!(
                "baseUrl '{}' is not an absolute URL",
                self.base_url
            )));
        }
        Ok(base)
    }

    pub fn validate(&self) -> Result<(), MockError> {
        self.base().map(|_| ())
    }
}
