use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost {
                host: self.host.clone(),
                source,
            })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),
    #[error("APP_HOST must parse to an IPv4 or IPv6 address, got '{host}'")]
    InvalidHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("defaults load");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_HOST", "0.0.0.0"),
            ("APP_PORT", "9000"),
            ("APP_LOG_LEVEL", "debug"),
        ]))
        .expect("config loads");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.telemetry.log_level, "debug");
        let addr = config.server.socket_addr().expect("valid address");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([0, 0, 0, 0]), 9000));
    }

    #[test]
    fn rejects_invalid_port() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_PORT", "http")]))
            .expect_err("port must be numeric");
        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn accepts_localhost_and_rejects_hostnames() {
        let mut config = AppConfig::from_lookup(lookup_from(&[("APP_HOST", "localhost")]))
            .expect("config loads");
        assert_eq!(
            config.server.socket_addr().expect("localhost resolves"),
            SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080)
        );

        config.server.host = "example.internal".to_string();
        let err = config.server.socket_addr().expect_err("hostnames are not resolved");
        assert!(err.to_string().contains("APP_HOST"));
    }
}
