// ABOUTME: Configuration parsing from TOML file with environment variable overrides
// ABOUTME: Validates the auth token and provides defaults for the optional fields

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bearer token for the handshake and all Web API calls.
    pub token: String,
    /// Whether a message must open with the bot's mention prefix to be
    /// treated as a command.
    #[serde(default = "default_require_prefix")]
    pub require_prefix: bool,
    /// Base URL of the Web API; overridable so tests can point at a mock.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_require_prefix() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://slack.com/api".to_string()
}

impl BotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            require_prefix: default_require_prefix(),
            api_base_url: default_api_base_url(),
        }
    }

    /// Load configuration from `rtmbot.toml` with environment variable overrides
    pub fn load() -> Result<Self> {
        Self::load_from("rtmbot.toml")
    }

    /// Load configuration from the given TOML file, falling back to
    /// defaults when it does not exist, then apply `SLACK_TOKEN`,
    /// `SLACK_REQUIRE_PREFIX`, and `SLACK_API_BASE_URL` overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str::<BotConfig>(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            BotConfig {
                token: String::new(),
                require_prefix: default_require_prefix(),
                api_base_url: default_api_base_url(),
            }
        };

        if let Ok(val) = std::env::var("SLACK_TOKEN") {
            config.token = val;
        }
        if let Ok(val) = std::env::var("SLACK_REQUIRE_PREFIX") {
            config.require_prefix = val
                .parse()
                .with_context(|| format!("SLACK_REQUIRE_PREFIX must be true or false, got: {}", val))?;
        }
        if let Ok(val) = std::env::var("SLACK_API_BASE_URL") {
            config.api_base_url = val;
        }

        if config.token.trim().is_empty() {
            anyhow::bail!("token is required (set in rtmbot.toml or SLACK_TOKEN env var)");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_defaults() {
        let config = BotConfig::new("xoxb-test");
        assert_eq!(config.token, "xoxb-test");
        assert!(config.require_prefix);
        assert_eq!(config.api_base_url, "https://slack.com/api");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token = \"xoxb-from-file\"\nrequire_prefix = false").unwrap();
        let config = BotConfig::load_from(file.path()).unwrap();
        assert_eq!(config.token, "xoxb-from-file");
        assert!(!config.require_prefix);
        assert_eq!(config.api_base_url, "https://slack.com/api");
    }

    #[test]
    fn test_load_missing_token_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token = \"\"").unwrap();
        let err = BotConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("token is required"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = BotConfig::new("xoxb-rt");
        let text = toml::to_string(&config).unwrap();
        let parsed: BotConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.token, config.token);
        assert_eq!(parsed.require_prefix, config.require_prefix);
    }
}
