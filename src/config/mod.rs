// Configuration module entry point
// Loads layered configuration and builds the immutable runtime state

mod state;
mod types;

use config::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub use state::{AppState, ScriptPaths};
pub use types::Config;

/// Access log formats understood by `logger::format`
pub const ACCESS_LOG_FORMATS: &[&str] = &["common", "json"];

impl Config {
    /// Load configuration from an optional file path (without extension)
    ///
    /// Sources, lowest priority first: defaults, `config.toml` (or `path`),
    /// `MAIL_GATEWAY__*` environment variables.
    pub fn load_from(path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load(path, None)
    }

    /// Same as `load_from`, reading variables from `env` instead of the
    /// process environment when given
    fn load(path: Option<&str>, env: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => config::File::with_name(p).required(true),
            None => config::File::with_name("config").required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("scripts.authenticate", "authenticate.sh")?
            .set_default("scripts.contact", "contactUS.sh")?
            .set_default("scripts.timeout_secs", 30)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 75)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("MAIL_GATEWAY")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject combinations the server cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scripts.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "scripts.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.performance.connection_timeout == 0 {
            return Err(ConfigError::Message(
                "performance.connection_timeout must be greater than 0".to_string(),
            ));
        }
        if !ACCESS_LOG_FORMATS.contains(&self.logging.access_log_format.as_str()) {
            return Err(ConfigError::Message(format!(
                "logging.access_log_format must be one of {ACCESS_LOG_FORMATS:?}, got '{}'",
                self.logging.access_log_format
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Directory the scripts are resolved against
    ///
    /// Without `scripts.dir`, this is `utils/` next to the running executable.
    pub fn scripts_dir(&self) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.scripts.dir {
            return Ok(PathBuf::from(dir));
        }
        let exe = std::env::current_exe()?;
        let base = exe.parent().map(PathBuf::from).unwrap_or_default();
        Ok(base.join("utils"))
    }
}

#[cfg(test)]
impl Config {
    /// Default settings with scripts resolved against `scripts_dir`
    pub fn for_tests(scripts_dir: &std::path::Path) -> Self {
        use types::{HttpConfig, LoggingConfig, PerformanceConfig, ScriptsConfig, ServerConfig};

        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                workers: None,
            },
            scripts: ScriptsConfig {
                dir: Some(scripts_dir.to_string_lossy().into_owned()),
                authenticate: "authenticate.sh".to_string(),
                contact: "contactUS.sh".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "common".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                connection_timeout: 75,
            },
            http: HttpConfig {
                max_body_size: 1024,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Write `contents` to `gateway.toml` in `dir` and return the path without extension
    fn config_file(dir: &Path, contents: &str) -> String {
        std::fs::write(dir.join("gateway.toml"), contents).unwrap();
        dir.join("gateway").to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file(dir.path(), "");
        let cfg = Config::load(Some(&path), Some(config::Map::new())).unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.scripts.timeout_secs, 30);
        assert_eq!(cfg.scripts.authenticate, "authenticate.sh");
        assert_eq!(cfg.scripts.contact, "contactUS.sh");
        assert_eq!(cfg.performance.connection_timeout, 75);
        assert_eq!(cfg.http.max_body_size, 1_048_576);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file(dir.path(), "[server]\nport = 8123\n\n[scripts]\ntimeout_secs = 12\n");
        let env = config::Map::from([(
            "MAIL_GATEWAY__SERVER__PORT".to_string(),
            "9000".to_string(),
        )]);
        let cfg = Config::load(Some(&path), Some(env)).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.scripts.timeout_secs, 12);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").to_string_lossy().into_owned();
        assert!(Config::load(Some(&path), Some(config::Map::new())).is_err());
    }

    #[test]
    fn test_sample_is_valid() {
        let cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        assert!(cfg.validate().is_ok());
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:8000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_connection_timeout_may_be_shorter_than_script_timeout() {
        let mut cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        cfg.performance.connection_timeout = 5;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_connection_timeout_rejected() {
        let mut cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        cfg.performance.connection_timeout = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("connection_timeout"));
    }

    #[test]
    fn test_zero_script_timeout_rejected() {
        let mut cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        cfg.scripts.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unknown_access_log_format_rejected() {
        let mut cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        cfg.logging.access_log_format = "combined".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_scripts_dir_override() {
        let cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        assert_eq!(cfg.scripts_dir().unwrap(), PathBuf::from("/opt/mail/utils"));
    }

    #[test]
    fn test_scripts_dir_defaults_next_to_executable() {
        let mut cfg = Config::for_tests(Path::new("/opt/mail/utils"));
        cfg.scripts.dir = None;
        let dir = cfg.scripts_dir().unwrap();
        assert!(dir.ends_with("utils"));
    }
}
