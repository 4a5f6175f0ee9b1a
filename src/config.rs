//! Connection settings for the management API.
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding the declared host.
pub const HOST_ENV: &str = "PANOP_HOST";
/// Environment variable overriding the declared access key.
pub const ACCESS_KEY_ENV: &str = "PANOP_ACCESS_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API host configured (set --host or PANOP_HOST)")]
    MissingHost,
}

/// Values declared by the caller before environment overrides are applied.
#[derive(Debug, Default, Clone)]
pub struct DeclaredConfig {
    pub host: Option<String>,
    pub skip_tls_verify: Option<bool>,
    pub access_key: Option<String>,
}

/// Immutable API settings shared by every reconciler and lister in a session.
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub skip_tls_verify: bool,
    pub access_key: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

impl ApiConfig {
    /// Resolve settings from the process environment.
    pub fn from_env(declared: DeclaredConfig) -> Result<Self, ConfigError> {
        Self::resolve(declared, |key| std::env::var(key).ok())
    }

    /// Resolve settings, letting a non-empty environment value win over the
    /// declared one.
    pub fn resolve<F>(declared: DeclaredConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, declared: Option<String>| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or(declared.filter(|v| !v.trim().is_empty()))
        };

        let host = pick(HOST_ENV, declared.host).ok_or(ConfigError::MissingHost)?;
        let access_key = pick(ACCESS_KEY_ENV, declared.access_key).unwrap_or_else(|| {
            warn!("no access key configured; requests will carry an empty bearer token");
            String::new()
        });

        Ok(Self {
            host: host.trim().to_string(),
            skip_tls_verify: declared.skip_tls_verify.unwrap_or(false),
            access_key,
        })
    }

    /// Base URL every request path is joined onto (no trailing slash).
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("https://") || host.starts_with("http://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn environment_overrides_declared_values() {
        let declared = DeclaredConfig {
            host: Some("declared.example".into()),
            skip_tls_verify: Some(true),
            access_key: Some("declared-key".into()),
        };
        let cfg = ApiConfig::resolve(
            declared,
            env_of(&[(HOST_ENV, "env.example"), (ACCESS_KEY_ENV, "env-key")]),
        )
        .unwrap();

        assert_eq!(cfg.host, "env.example");
        assert_eq!(cfg.access_key, "env-key");
        assert!(cfg.skip_tls_verify);
    }

    #[test]
    fn declared_values_used_when_env_is_empty() {
        let declared = DeclaredConfig {
            host: Some("tower.example".into()),
            skip_tls_verify: None,
            access_key: Some("k".into()),
        };
        let cfg = ApiConfig::resolve(declared, env_of(&[(HOST_ENV, "")])).unwrap();

        assert_eq!(cfg.host, "tower.example");
        assert_eq!(cfg.access_key, "k");
        assert!(!cfg.skip_tls_verify);
    }

    #[test]
    fn host_is_required() {
        let err = ApiConfig::resolve(DeclaredConfig::default(), env_of(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingHost);
    }

    #[test]
    fn missing_access_key_resolves_to_empty() {
        let declared = DeclaredConfig {
            host: Some("tower.example".into()),
            ..Default::default()
        };
        let cfg = ApiConfig::resolve(declared, env_of(&[])).unwrap();
        assert_eq!(cfg.access_key, "");
    }

    #[test]
    fn base_url_defaults_to_https() {
        let mut cfg = ApiConfig {
            host: "tower.example".into(),
            skip_tls_verify: false,
            access_key: String::new(),
        };
        assert_eq!(cfg.base_url(), "https://tower.example");

        cfg.host = "http://127.0.0.1:8080/".into();
        assert_eq!(cfg.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn debug_hides_access_key() {
        let cfg = ApiConfig {
            host: "tower.example".into(),
            skip_tls_verify: false,
            access_key: "super-secret".into(),
        };
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }
}
