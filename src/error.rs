//! Error types for hostctl

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum HostctlError {
    /// IO error
    Io(io::Error),
    /// Command execution failed
    CommandFailed { cmd: String, code: Option<i32>, stderr: String },
    /// Invalid parameter
    InvalidParameter(String),
    /// Parse error
    ParseError(String),
    /// Configuration error
    ConfigError(String),
    /// Connection is not a wireless connection
    NotWireless { connection: String, actual: String },
    /// Not supported
    NotSupported(String),
}

impl fmt::Display for HostctlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostctlError::Io(e) => write!(f, "IO error: {}", e),
            HostctlError::CommandFailed { cmd, code, stderr } => {
                if let Some(code) = code {
                    write!(f, "Command '{}' failed with code {}: {}", cmd, code, stderr)
                } else {
                    write!(f, "Command '{}' failed: {}", cmd, stderr)
                }
            }
            HostctlError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            HostctlError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            HostctlError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            HostctlError::NotWireless { connection, actual } => {
                write!(
                    f,
                    "Connection '{}' is not a wireless connection but a {} connection",
                    connection, actual
                )
            }
            HostctlError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
        }
    }
}

impl std::error::Error for HostctlError {}

impl From<io::Error> for HostctlError {
    fn from(error: io::Error) -> Self {
        HostctlError::Io(error)
    }
}

pub type HostctlResult<T> = Result<T, HostctlError>;
