//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5050;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where product lookups are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A remote catalog service at this address.
    Remote(String),
    /// A local JSON file, optionally re-read on an interval.
    File {
        path: PathBuf,
        reload_interval: Option<Duration>,
    },
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `CART_SERVICE_ADDR`, `SHIPPING_SERVICE_ADDR`, `PAYMENT_SERVICE_ADDR`,
///   `EMAIL_SERVICE_ADDR`: collaborator addresses (required)
/// - `PRODUCT_CATALOG_SERVICE_ADDR`: catalog address (required unless
///   `CATALOG_FILE` is set, which takes precedence)
/// - `CATALOG_RELOAD_INTERVAL_SECS`: poll interval for `CATALOG_FILE`
/// - `HOST` (default `"0.0.0.0"`), `PORT` (default `5050`)
/// - `DISABLE_STATS`: any non-empty value turns off Prometheus metrics
/// - `REQUEST_TIMEOUT_MS`: deadline for each order (default `30000`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cart_addr: String,
    pub catalog: CatalogSource,
    pub shipping_addr: String,
    pub payment_addr: String,
    pub email_addr: String,
    pub disable_stats: bool,
    pub request_timeout: Duration,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let required = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let catalog = match get("CATALOG_FILE") {
            Some(path) => CatalogSource::File {
                path: PathBuf::from(path),
                reload_interval: parse::<u64>(&get, "CATALOG_RELOAD_INTERVAL_SECS")?
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
            },
            None => CatalogSource::Remote(required("PRODUCT_CATALOG_SERVICE_ADDR")?),
        };

        let request_timeout_ms =
            parse::<u64>(&get, "REQUEST_TIMEOUT_MS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        if request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_MS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse(&get, "PORT")?.unwrap_or(DEFAULT_PORT),
            cart_addr: required("CART_SERVICE_ADDR")?,
            catalog,
            shipping_addr: required("SHIPPING_SERVICE_ADDR")?,
            payment_addr: required("PAYMENT_SERVICE_ADDR")?,
            email_addr: required("EMAIL_SERVICE_ADDR")?,
            disable_stats: get("DISABLE_STATS").is_some(),
            request_timeout: Duration::from_millis(request_timeout_ms),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var,
                    reason: e.to_string(),
                    value,
                })
        })
        .transpose()
}
