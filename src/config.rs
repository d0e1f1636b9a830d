use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

use crate::external::alphavantage::DEFAULT_BASE_URL;
use crate::services::fetch_service::RetryPolicy;

pub const DEFAULT_PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub bind_addr: IpAddr,
    /// 0 lets the OS pick a free port.
    pub port: u16,
    pub retry: RetryPolicy,
    /// Origins allowed to open a dashboard session besides the page's own.
    pub allowed_origins: Vec<String>,
    pub plotly_src: String,
    /// Subresource-integrity digest for `plotly_src`, e.g. `sha384-...`.
    pub plotly_sri: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ALPHA_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("ALPHA_API_KEY"))?;

        let base_url = lookup("ALPHA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            key: "ALPHA_BASE_URL",
            reason: e.to_string(),
        })?;

        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or("PORT", lookup("PORT"), 0u16)?;

        let defaults = RetryPolicy::default();
        let max_attempts = parse_or("FETCH_MAX_ATTEMPTS", lookup("FETCH_MAX_ATTEMPTS"), defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "FETCH_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }
        let delay_unit_ms = parse_or(
            "FETCH_DELAY_UNIT_MS",
            lookup("FETCH_DELAY_UNIT_MS"),
            defaults.delay_unit.as_millis() as u64,
        )?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(|o| o.trim_end_matches('/').to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        for origin in &allowed_origins {
            url::Url::parse(origin).map_err(|e| ConfigError::Invalid {
                key: "ALLOWED_ORIGINS",
                reason: format!("{}: {}", origin, e),
            })?;
        }

        let plotly_src = lookup("PLOTLY_SRC").unwrap_or_else(|| DEFAULT_PLOTLY_SRC.to_string());
        url::Url::parse(&plotly_src).map_err(|e| ConfigError::Invalid {
            key: "PLOTLY_SRC",
            reason: e.to_string(),
        })?;

        let plotly_sri = lookup("PLOTLY_SRI")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        if let Some(sri) = &plotly_sri {
            let known = ["sha256-", "sha384-", "sha512-"];
            if !known.iter().any(|prefix| sri.starts_with(prefix)) {
                return Err(ConfigError::Invalid {
                    key: "PLOTLY_SRI",
                    reason: format!("{:?} is not a sha256/sha384/sha512 digest", sri),
                });
            }
        }

        Ok(Self {
            api_key,
            base_url,
            bind_addr,
            port,
            retry: RetryPolicy {
                max_attempts,
                delay_unit: Duration::from_millis(delay_unit_ms),
                attempts_per_step: defaults.attempts_per_step,
            },
            allowed_origins,
            plotly_src,
            plotly_sri,
        })
    }

    /// Same-origin requests are always allowed; other origins only when
    /// listed. Non-browser clients send no `Origin` and are allowed only while
    /// no list is configured.
    pub fn origin_allowed(&self, origin: Option<&str>, host: Option<&str>) -> bool {
        let Some(origin) = origin else {
            return self.allowed_origins.is_empty();
        };

        if host.is_some_and(|host| same_origin(origin, host)) {
            return true;
        }

        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Whether `origin` (`scheme://host[:port]`) names the server reached via the
/// `Host` header. A missing port on either side means the scheme's default.
fn same_origin(origin: &str, host: &str) -> bool {
    let Ok(url) = url::Url::parse(origin) else {
        return false;
    };
    let Some(origin_host) = url.host_str() else {
        return false;
    };

    let (host_name, host_port) = match host.trim().rsplit_once(':') {
        Some((name, port)) => match port.parse::<u16>() {
            Ok(port) => (name, Some(port)),
            Err(_) => (host.trim(), None),
        },
        None => (host.trim(), None),
    };

    origin_host.eq_ignore_ascii_case(host_name)
        && url.port_or_known_default() == host_port.or(default_port(url.scheme()))
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("{:?}: {}", value, e),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("ALPHA_API_KEY", "demo")])).unwrap();

        assert_eq!(config.api_key, "demo");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.bind_addr, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.port, 0);
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_missing_api_key() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ALPHA_API_KEY")));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ALPHA_API_KEY", "demo"),
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "5006"),
            ("FETCH_MAX_ATTEMPTS", "100"),
            ("FETCH_DELAY_UNIT_MS", "250"),
            ("ALLOWED_ORIGINS", "http://localhost:8000/, https://example.com"),
        ]))
        .unwrap();

        assert_eq!(config.port, 5006);
        assert_eq!(config.retry.max_attempts, 100);
        assert_eq!(config.retry.delay_unit, Duration::from_millis(250));
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:8000".to_string(), "https://example.com".to_string()]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("ALPHA_API_KEY", "demo"), ("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = AppConfig::from_lookup(lookup(&[("ALPHA_API_KEY", "demo"), ("FETCH_MAX_ATTEMPTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FETCH_MAX_ATTEMPTS", .. }));
    }

    #[test]
    fn test_origin_check() {
        let open = AppConfig::from_lookup(lookup(&[("ALPHA_API_KEY", "demo")])).unwrap();
        assert!(open.origin_allowed(None, Some("localhost:5006")));
        assert!(open.origin_allowed(Some("http://localhost:5006"), Some("localhost:5006")));
        assert!(!open.origin_allowed(Some("http://evil.example"), Some("localhost:5006")));
        assert!(!open.origin_allowed(Some("http://localhost:8000"), Some("localhost:5006")));
        assert!(!open.origin_allowed(Some("http://localhost:5006"), None));

        let locked = AppConfig::from_lookup(lookup(&[
            ("ALPHA_API_KEY", "demo"),
            ("ALLOWED_ORIGINS", "http://localhost:8000"),
        ]))
        .unwrap();
        assert!(locked.origin_allowed(Some("http://localhost:8000"), Some("localhost:5006")));
        assert!(locked.origin_allowed(Some("http://localhost:5006"), Some("localhost:5006")));
        assert!(!locked.origin_allowed(Some("http://evil.example"), Some("localhost:5006")));
        assert!(!locked.origin_allowed(None, Some("localhost:5006")));
    }

    #[test]
    fn test_same_origin_uses_default_ports() {
        assert!(same_origin("https://dash.example", "dash.example"));
        assert!(same_origin("https://dash.example", "DASH.example:443"));
        assert!(!same_origin("https://dash.example", "dash.example:8443"));
        assert!(same_origin("http://[::1]:5006", "[::1]:5006"));
        assert!(!same_origin("null", "dash.example"));
    }

    #[test]
    fn test_plotly_integrity() {
        let config = AppConfig::from_lookup(lookup(&[("ALPHA_API_KEY", "demo")])).unwrap();
        assert_eq!(config.plotly_src, DEFAULT_PLOTLY_SRC);
        assert!(config.plotly_sri.is_none());

        let config = AppConfig::from_lookup(lookup(&[
            ("ALPHA_API_KEY", "demo"),
            ("PLOTLY_SRI", "sha384-abc123"),
        ]))
        .unwrap();
        assert_eq!(config.plotly_sri.as_deref(), Some("sha384-abc123"));

        let err = AppConfig::from_lookup(lookup(&[
            ("ALPHA_API_KEY", "demo"),
            ("PLOTLY_SRI", "md5-abc123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PLOTLY_SRI", .. }));
    }
}
