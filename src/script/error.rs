// Script invocation errors

use std::fmt;
use std::io;
use std::time::Duration;

/// Operational failures of a script invocation
///
/// A script that runs and exits non-zero is not an error here; see
/// `ScriptOutput::success`.
#[derive(Debug)]
pub enum ScriptError {
    /// The script does not exist
    NotFound,
    /// The script exists but may not be executed
    NotExecutable,
    /// The script outlived its timeout and was killed
    Timeout(Duration),
    /// Any other spawn or pipe failure
    Io(io::Error),
}

impl ScriptError {
    /// Classify an error returned by `Command::spawn`
    pub fn from_spawn(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::NotExecutable,
            _ => Self::Io(err),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "script not found"),
            Self::NotExecutable => write!(f, "script not executable"),
            Self::Timeout(t) => write!(f, "script timed out after {}s", t.as_secs_f64()),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
