// Application state module
// Immutable runtime state shared by all connections

use std::path::PathBuf;
use std::time::Duration;

use super::types::Config;

/// Resolved locations of the external scripts
#[derive(Debug, Clone)]
pub struct ScriptPaths {
    pub authenticate: PathBuf,
    pub contact: PathBuf,
}

/// Application state
///
/// Nothing here changes after startup; requests only read from it.
pub struct AppState {
    pub config: Config,
    pub scripts: ScriptPaths,
    pub script_timeout: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> std::io::Result<Self> {
        let dir = config.scripts_dir()?;
        let scripts = ScriptPaths {
            authenticate: dir.join(&config.scripts.authenticate),
            contact: dir.join(&config.scripts.contact),
        };
        Ok(Self::with_scripts(
            config,
            scripts,
            Duration::from_secs(config.scripts.timeout_secs),
        ))
    }

    /// Build state with explicit script paths and timeout
    pub fn with_scripts(config: &Config, scripts: ScriptPaths, script_timeout: Duration) -> Self {
        Self {
            config: config.clone(),
            scripts,
            script_timeout,
        }
    }
}
