use std::path::PathBuf;
use std::str::FromStr;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("DATABASE_PATH is not set and HOME is unavailable")]
    NoDatabasePath,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a single-user local install.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// SQLite database file (default: `$HOME/.focus/data.db`).
    pub database_path: PathBuf,
    /// Log level used when `RUST_LOG` is unset (default: `info`).
    pub log_level: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `15`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Requests allowed per client per window (default: `100`).
    pub rate_limit_max_requests: usize,
    /// Rate limit window in seconds (default: `60`).
    pub rate_limit_window_secs: u64,
    /// Maximum accepted request body in bytes (default: 10 MiB).
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                        |
    /// |---------------------------|------------------------------------------------|
    /// | `HOST`                    | `127.0.0.1`                                    |
    /// | `PORT`                    | `8080`                                         |
    /// | `DATABASE_PATH`           | `$HOME/.focus/data.db`                         |
    /// | `LOG_LEVEL`               | `info`                                         |
    /// | `CORS_ORIGINS`            | `http://localhost:5173,http://127.0.0.1:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `15`                                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                                           |
    /// | `RATE_LIMIT_MAX_REQUESTS` | `100`                                          |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `60`                                           |
    /// | `MAX_BODY_BYTES`          | `10485760`                                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = parse_var("PORT", 8080)?;

        let database_path = match std::env::var("DATABASE_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            database_path,
            log_level,
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 15)?,
            shutdown_timeout_secs: parse_var("SHUTDOWN_TIMEOUT_SECS", 30)?,
            rate_limit_max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS", 100)?,
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS", 60)?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// `tracing` filter directives derived from `log_level`.
    pub fn log_filter(&self) -> String {
        let level = &self.log_level;
        format!("focus_api={level},focus_db={level},tower_http={level}")
    }
}

fn parse_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn default_database_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::NoDatabasePath)?;
    Ok(PathBuf::from(home).join(".focus").join("data.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_covers_workspace_crates() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: PathBuf::from("test.db"),
            log_level: "debug".into(),
            cors_origins: vec![],
            request_timeout_secs: 15,
            shutdown_timeout_secs: 30,
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 60,
            max_body_bytes: 1024,
        };
        assert_eq!(
            config.log_filter(),
            "focus_api=debug,focus_db=debug,tower_http=debug"
        );
    }

    #[test]
    fn unset_variable_uses_default() {
        let port: u16 = parse_var("FOCUS_TEST_SURELY_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
