//! Application configuration loaded from environment variables.

use common::{AdminId, Caller, CollectorId, RequesterId};
use uuid::Uuid;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
/// - `DATABASE_URL`: Postgres connection string; the in-memory store is used when unset
/// - `NEARBY_DEFAULT_RADIUS_KM`: radius for nearby searches that give none (default: `5`)
/// - `HIGH_VALUE_THRESHOLD`: minimum estimate for the high-value list (default: `1000`)
/// - `IDENTITY_TOKENS`: comma-separated `token=role:uuid` entries seeded into
///   the in-memory identity store
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub nearby_default_radius_km: f64,
    pub high_value_threshold: f64,
    pub identity_tokens: Vec<(String, Caller)>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: std::env::var("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            nearby_default_radius_km: parse_positive("NEARBY_DEFAULT_RADIUS_KM")
                .unwrap_or(defaults.nearby_default_radius_km),
            high_value_threshold: parse_positive("HIGH_VALUE_THRESHOLD")
                .unwrap_or(defaults.high_value_threshold),
            identity_tokens: std::env::var("IDENTITY_TOKENS")
                .map(|v| parse_identity_tokens(&v))
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            nearby_default_radius_km: queries::DEFAULT_RADIUS_KM,
            high_value_threshold: queries::DEFAULT_HIGH_VALUE_THRESHOLD,
            identity_tokens: Vec::new(),
        }
    }
}

fn parse_positive(var: &str) -> Option<f64> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parses `token=role:uuid` entries. Malformed entries are skipped.
pub fn parse_identity_tokens(value: &str) -> Vec<(String, Caller)> {
    value
        .split(',')
        .filter_map(|entry| {
            let (token, claim) = entry.trim().split_once('=')?;
            let (role, id) = claim.split_once(':')?;
            let id = Uuid::parse_str(id.trim()).ok()?;
            let caller = match role.trim() {
                "requester" => Caller::Requester(RequesterId::from_uuid(id)),
                "collector" => Caller::Collector(CollectorId::from_uuid(id)),
                "admin" => Caller::Admin(AdminId::from_uuid(id)),
                _ => return None,
            };
            let token = token.trim();
            (!token.is_empty()).then(|| (token.to_string(), caller))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_url.is_none());
        assert_eq!(config.nearby_default_radius_km, 5.0);
        assert_eq!(config.high_value_threshold, 1000.0);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_identity_tokens() {
        let id = Uuid::new_v4();
        let parsed = parse_identity_tokens(&format!(
            "alice=requester:{id}, bob=collector:{id},broken,eve=root:{id},=admin:{id}"
        ));

        assert_eq!(
            parsed,
            vec![
                ("alice".to_string(), Caller::Requester(RequesterId::from_uuid(id))),
                ("bob".to_string(), Caller::Collector(CollectorId::from_uuid(id))),
            ]
        );
    }
}
