use crate::api::response::managed_devices;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Endpoints and client settings for an unauthenticated API handle.
#[derive(Debug, Clone)]
pub struct Api {
    pub authority_url: String,
    pub graph_url: String,
    pub timeout: Duration,
}

/// Authenticated API handle holding a bearer token for Microsoft Graph.
pub struct LoggedInApi {
    pub graph_url: String,
    pub tenant: String,
    pub access_token: String,
    pub client: reqwest::Client,
}

impl fmt::Debug for LoggedInApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedInApi")
            .field("graph_url", &self.graph_url)
            .field("tenant", &self.tenant)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// How a session gets established.
#[derive(Clone, PartialEq, Eq)]
pub enum Login {
    /// Device code flow; a user signs in through a browser.
    Interactive {
        tenant_id: Option<String>,
        client_id: String,
    },
    /// Client credentials grant for an application identity.
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Login::Interactive {
                tenant_id,
                client_id,
            } => f
                .debug_struct("Interactive")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish(),
            Login::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

/// A managed device projected to the exported fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDevice {
    pub device_name: Option<String>,
    pub id: String,
    pub model: Option<String>,
    pub last_sync_date_time: DateTime<Utc>,
}

impl ManagedDevice {
    pub fn has_name(&self) -> bool {
        self.device_name
            .as_deref()
            .map_or(false, |name| !name.is_empty())
    }
}

impl From<managed_devices::Data> for ManagedDevice {
    fn from(data: managed_devices::Data) -> Self {
        ManagedDevice {
            device_name: data.device_name,
            id: data.id,
            model: data.model,
            last_sync_date_time: data.last_sync_date_time,
        }
    }
}
