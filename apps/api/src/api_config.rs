use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use openbook_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Where session identities and grants come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDirectoryConfig {
    Http { backend_api_url: Url },
    Static { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub access_directory: AccessDirectoryConfig,
    pub upstream_timeout: Duration,
    pub module_catalog_path: Option<PathBuf>,
    pub snapshot_cache_ttl_seconds: u32,
    pub redis_url: Option<String>,
    pub snapshot_cache_key_prefix: String,
    pub session_cookie_name: String,
    pub login_path: String,
    pub dashboard_path: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", optional("API_PORT"), 3001_u16)?;

        let access_directory = match optional("ACCESS_DIRECTORY")
            .unwrap_or_else(|| "http".to_owned())
            .as_str()
        {
            "http" => {
                let raw_url = required("BACKEND_API_URL")?;
                let backend_api_url = Url::parse(raw_url.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid BACKEND_API_URL: {error}"))
                })?;
                AccessDirectoryConfig::Http { backend_api_url }
            }
            "static" => AccessDirectoryConfig::Static {
                path: PathBuf::from(required("STATIC_ACCESS_PATH")?),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "ACCESS_DIRECTORY must be either 'http' or 'static', got '{other}'"
                )));
            }
        };

        let upstream_timeout = Duration::from_millis(parse_or(
            "UPSTREAM_TIMEOUT_MS",
            optional("UPSTREAM_TIMEOUT_MS"),
            5000_u64,
        )?);
        let snapshot_cache_ttl_seconds = parse_or(
            "SNAPSHOT_CACHE_TTL_SECONDS",
            optional("SNAPSHOT_CACHE_TTL_SECONDS"),
            0_u32,
        )?;

        let login_path = app_path("LOGIN_PATH", optional("LOGIN_PATH"), "/login")?;
        let dashboard_path = app_path("DASHBOARD_PATH", optional("DASHBOARD_PATH"), "/dashboard")?;

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            access_directory,
            upstream_timeout,
            module_catalog_path: optional("MODULE_CATALOG_PATH").map(PathBuf::from),
            snapshot_cache_ttl_seconds,
            redis_url: optional("REDIS_URL"),
            snapshot_cache_key_prefix: optional("SNAPSHOT_CACHE_KEY_PREFIX")
                .unwrap_or_else(|| "openbook:snapshot".to_owned()),
            session_cookie_name: optional("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "token".to_owned()),
            login_path,
            dashboard_path,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

fn app_path(name: &str, value: Option<String>, default: &str) -> Result<String, AppError> {
    let path = value.unwrap_or_else(|| default.to_owned());
    if !path.starts_with('/') {
        return Err(AppError::Validation(format!(
            "{name} must start with '/', got '{path}'"
        )));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use openbook_core::AppError;

    use super::{AccessDirectoryConfig, ApiConfig};

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let vars = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn http_directory_uses_defaults() {
        let config = load(&[("BACKEND_API_URL", "https://backend.openbook.co/api")]);
        let Ok(config) = config else {
            panic!("config should load");
        };

        assert!(matches!(
            config.access_directory,
            AccessDirectoryConfig::Http { .. }
        ));
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.upstream_timeout, Duration::from_millis(5000));
        assert_eq!(config.snapshot_cache_ttl_seconds, 0);
        assert_eq!(config.session_cookie_name, "token");
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.dashboard_path, "/dashboard");
        assert_eq!(config.snapshot_cache_key_prefix, "openbook:snapshot");
        assert!(config.socket_address().is_ok());
    }

    #[test]
    fn http_directory_requires_backend_url() {
        assert!(matches!(load(&[]), Err(AppError::Validation(_))));
        assert!(matches!(
            load(&[("BACKEND_API_URL", "not a url")]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn static_directory_requires_path() {
        assert!(matches!(
            load(&[("ACCESS_DIRECTORY", "static")]),
            Err(AppError::Validation(_))
        ));

        let config = load(&[
            ("ACCESS_DIRECTORY", "static"),
            ("STATIC_ACCESS_PATH", "dev/sessions.json"),
        ]);
        assert!(config.is_ok_and(|config| matches!(
            config.access_directory,
            AccessDirectoryConfig::Static { .. }
        )));
    }

    #[test]
    fn invalid_values_fail_startup() {
        let base = ("BACKEND_API_URL", "http://localhost:8000");
        for invalid in [
            ("API_PORT", "http"),
            ("UPSTREAM_TIMEOUT_MS", "-1"),
            ("SNAPSHOT_CACHE_TTL_SECONDS", "soon"),
            ("LOGIN_PATH", "login"),
            ("ACCESS_DIRECTORY", "ldap"),
        ] {
            assert!(
                matches!(load(&[base, invalid]), Err(AppError::Validation(_))),
                "{} should be rejected",
                invalid.0
            );
        }
    }
}
