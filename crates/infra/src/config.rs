//! Configuration loading from the process environment.
//!
//! | variable | default |
//! |----------|---------|
//! | `GYMDESK_BIND_ADDR` | `0.0.0.0:8080` |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when persistent |
//! | `GYMDESK_CURRENCY_SYMBOL` | `₹` |
//! | `GYMDESK_DIGIT_GROUPING` | `indian` |
//! | `GYMDESK_DEFAULT_COUNTRY_CODE` | `91` |

use std::net::SocketAddr;

use thiserror::Error;

use gymdesk_billing::{CurrencyFormat, DigitGrouping};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Which repository backend the API wires up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub currency: CurrencyFormat,
    /// Prefixed to 10-digit local numbers in WhatsApp links.
    pub default_country_code: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage: StorageConfig::InMemory,
            currency: CurrencyFormat::default(),
            default_country_code: "91".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get("GYMDESK_BIND_ADDR") {
            Some(v) => v.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "GYMDESK_BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => fallback("GYMDESK_BIND_ADDR", defaults.bind_addr),
        };

        let persistent = match get("USE_PERSISTENT_STORES").as_deref() {
            None => false,
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "USE_PERSISTENT_STORES",
                    reason: format!("expected true/false, got '{other}'"),
                });
            }
        };

        let storage = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            StorageConfig::Postgres { database_url }
        } else {
            tracing::warn!("USE_PERSISTENT_STORES not enabled; payments are kept in memory");
            StorageConfig::InMemory
        };

        let grouping = match get("GYMDESK_DIGIT_GROUPING") {
            Some(v) => v.parse::<DigitGrouping>().map_err(|e| ConfigError::Invalid {
                var: "GYMDESK_DIGIT_GROUPING",
                reason: e.to_string(),
            })?,
            None => fallback("GYMDESK_DIGIT_GROUPING", defaults.currency.grouping),
        };
        let symbol = get("GYMDESK_CURRENCY_SYMBOL")
            .unwrap_or_else(|| fallback("GYMDESK_CURRENCY_SYMBOL", defaults.currency.symbol));

        let default_country_code = match get("GYMDESK_DEFAULT_COUNTRY_CODE") {
            Some(v) => {
                let digits = v.trim_start_matches('+').to_string();
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ConfigError::Invalid {
                        var: "GYMDESK_DEFAULT_COUNTRY_CODE",
                        reason: format!("expected digits, got '{v}'"),
                    });
                }
                digits
            }
            None => fallback("GYMDESK_DEFAULT_COUNTRY_CODE", defaults.default_country_code),
        };

        Ok(Self {
            bind_addr,
            storage,
            currency: CurrencyFormat::new(symbol, grouping),
            default_country_code,
        })
    }
}

fn fallback<T: std::fmt::Debug>(var: &'static str, default: T) -> T {
    tracing::warn!(var, default = ?default, "{var} not set; using default");
    default
}
