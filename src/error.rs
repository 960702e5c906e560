use std::io;
use std::path::PathBuf;

/// Failure kinds that abort a run. Each maps to its own process exit code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Device retrieval failed: {0}")]
    Retrieval(#[source] crate::api::Error),

    #[error("Export to {} failed: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Authentication(_) => 2,
            Error::Retrieval(_) => 3,
            Error::Export { .. } => 4,
            Error::Configuration(_) => 5,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Configuration(error.to_string())
    }
}
