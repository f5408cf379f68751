//! Server configuration read from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Name of the only provider this build ships.
pub const STATIC_PROVIDER: &str = "static";

/// Runtime configuration of the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// YAML catalog to serve; the embedded demo story when `None`.
    pub content_path: Option<PathBuf>,
    /// Time allowed for one provider call.
    pub provider_timeout: Duration,
    /// Time a traversal may sit idle before it is evicted.
    pub traversal_idle_timeout: Duration,
}

impl ApiConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let provider = lookup("NEARFIELD_PROVIDER").unwrap_or_else(|| STATIC_PROVIDER.to_owned());
        match provider.as_str() {
            STATIC_PROVIDER => {}
            "generative" => {
                return Err(AppError::Config(
                    "NEARFIELD_PROVIDER=generative is not available in this build".to_owned(),
                ));
            }
            other => {
                return Err(AppError::Config(format!(
                    "NEARFIELD_PROVIDER must be \"static\", got {other:?}"
                )));
            }
        }

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

        let timeout_ms = match lookup("NEARFIELD_PROVIDER_TIMEOUT_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::Config(format!(
                    "NEARFIELD_PROVIDER_TIMEOUT_MS must be a positive integer: {e}"
                ))
            })?,
            None => 5000,
        };
        if timeout_ms == 0 {
            return Err(AppError::Config(
                "NEARFIELD_PROVIDER_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        let idle_secs = match lookup("NEARFIELD_TRAVERSAL_IDLE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::Config(format!(
                    "NEARFIELD_TRAVERSAL_IDLE_TIMEOUT_SECS must be a positive integer: {e}"
                ))
            })?,
            None => 3600,
        };
        if idle_secs == 0 {
            return Err(AppError::Config(
                "NEARFIELD_TRAVERSAL_IDLE_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            host,
            port,
            content_path: lookup("NEARFIELD_CONTENT_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            provider_timeout: Duration::from_millis(timeout_ms),
            traversal_idle_timeout: Duration::from_secs(idle_secs),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form a socket
    /// address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.content_path.is_none());
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
        assert_eq!(config.traversal_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_explicit_values_are_read() {
        // Arrange
        let vars = [
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("NEARFIELD_PROVIDER", "static"),
            ("NEARFIELD_CONTENT_PATH", "/srv/stories.yaml"),
            ("NEARFIELD_PROVIDER_TIMEOUT_MS", "250"),
            ("NEARFIELD_TRAVERSAL_IDLE_TIMEOUT_SECS", "900"),
        ];

        // Act
        let config = config_from(&vars).unwrap();

        // Assert
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.content_path,
            Some(PathBuf::from("/srv/stories.yaml"))
        );
        assert_eq!(config.provider_timeout, Duration::from_millis(250));
        assert_eq!(config.traversal_idle_timeout, Duration::from_secs(900));
    }

    #[test]
    fn test_generative_provider_is_rejected() {
        let result = config_from(&[("NEARFIELD_PROVIDER", "generative")]);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("generative")));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            config_from(&[("PORT", "seventy")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("NEARFIELD_PROVIDER_TIMEOUT_MS", "0")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("NEARFIELD_PROVIDER", "oracle")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("NEARFIELD_TRAVERSAL_IDLE_TIMEOUT_SECS", "0")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_unparsable_host_fails_at_bind_address() {
        let config = config_from(&[("HOST", "not a host")]).unwrap();

        assert!(matches!(config.socket_addr(), Err(AppError::Config(_))));
    }
}
