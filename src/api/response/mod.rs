pub mod device_code;
pub mod managed_devices;
pub mod token;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphErrorDetail {
    pub code: String,
    pub message: Option<String>,
}

/* Error bodies: Graph nests them under `error`, the identity platform uses flat OAuth fields */
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorResponse {
    Graph {
        error: GraphErrorDetail,
    },
    OAuth {
        error: String,
        error_description: Option<String>,
    },
}

impl ErrorResponse {
    pub fn code(&self) -> &str {
        match self {
            ErrorResponse::Graph { error } => &error.code,
            ErrorResponse::OAuth { error, .. } => error,
        }
    }

    pub fn message(&self) -> &str {
        let message = match self {
            ErrorResponse::Graph { error } => error.message.as_deref(),
            ErrorResponse::OAuth {
                error_description, ..
            } => error_description.as_deref(),
        };
        message.unwrap_or("(no error message received)")
    }
}
