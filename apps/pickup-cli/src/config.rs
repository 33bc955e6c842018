//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults; command-line flags override whatever is loaded here.
//!
//! | Variable                | Default | Meaning                          |
//! |-------------------------|---------|----------------------------------|
//! | `PICKUP_MODULE_WIDTH`   | `2`     | pixels per module                |
//! | `PICKUP_BAR_HEIGHT`     | `60`    | bar height in pixels             |
//! | `PICKUP_MARGIN`         | unset   | quiet zone (default 10 × module) |
//! | `PICKUP_STRICT_CHECK`   | `false` | reject wrong check digits        |
//! | `PICKUP_TOKEN_ATTEMPTS` | `8`     | allocation retries per token     |
//! | `PICKUP_LOG`            | `info`  | log filter when `RUST_LOG` unset |

use std::env;

use pickup_core::render::{DEFAULT_BAR_HEIGHT, DEFAULT_MODULE_WIDTH};
use pickup_core::token::DEFAULT_ALLOCATION_ATTEMPTS;
use pickup_core::{CheckDigitPolicy, RenderOptions};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Symbol size used when no flag overrides it
    pub render: RenderOptions,

    /// Check-digit policy for explicit renders
    pub policy: CheckDigitPolicy,

    /// Candidates tried per generated token
    pub token_attempts: usize,

    /// Log filter directive
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            render: RenderOptions::default(),
            policy: CheckDigitPolicy::Lenient,
            token_attempts: DEFAULT_ALLOCATION_ATTEMPTS,
            log_filter: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let module: u32 = parse_or(&lookup, "PICKUP_MODULE_WIDTH", DEFAULT_MODULE_WIDTH)?;
        let height: u32 = parse_or(&lookup, "PICKUP_BAR_HEIGHT", DEFAULT_BAR_HEIGHT)?;

        let margin = match lookup("PICKUP_MARGIN") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PICKUP_MARGIN".to_string()))?,
            ),
            None => None,
        };

        let strict: bool = parse_or(&lookup, "PICKUP_STRICT_CHECK", false)?;
        let token_attempts: usize =
            parse_or(&lookup, "PICKUP_TOKEN_ATTEMPTS", DEFAULT_ALLOCATION_ATTEMPTS)?;

        let config = CliConfig {
            render: RenderOptions { module, height, margin },
            policy: if strict {
                CheckDigitPolicy::Strict
            } else {
                CheckDigitPolicy::Lenient
            },
            token_attempts,
            log_filter: lookup("PICKUP_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.render.validate().is_err() {
            return Err(ConfigError::InvalidValue(
                "PICKUP_MODULE_WIDTH/PICKUP_BAR_HEIGHT must be positive".to_string(),
            ));
        }
        if config.token_attempts == 0 {
            return Err(ConfigError::InvalidValue("PICKUP_TOKEN_ATTEMPTS".to_string()));
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
