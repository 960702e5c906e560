//! Remote session abstraction over the device-management API.
//!
//! The run workflow only talks to this trait, so it can be exercised without a tenant.

use crate::api;
use crate::model::{self, Login, ManagedDevice};
use async_trait::async_trait;

#[async_trait]
pub trait DeviceManagementSession: Send + Sync {
    /// Whether an authenticated session is currently held.
    fn is_connected(&self) -> bool;

    /// Authenticate and hold the resulting session.
    async fn connect(&mut self, login: &Login) -> Result<(), api::Error>;

    /// Drop the session. Succeeds when no session is held.
    async fn disconnect(&mut self) -> Result<(), api::Error>;

    /// All managed devices visible to the session.
    async fn managed_devices(&self) -> Result<Vec<ManagedDevice>, api::Error>;
}

/// Session against Microsoft Graph.
#[derive(Debug)]
pub struct GraphSession {
    api: model::Api,
    logged_in: Option<model::LoggedInApi>,
}

impl GraphSession {
    pub fn new(api: model::Api) -> Self {
        GraphSession {
            api,
            logged_in: None,
        }
    }
}

#[async_trait]
impl DeviceManagementSession for GraphSession {
    fn is_connected(&self) -> bool {
        self.logged_in.is_some()
    }

    async fn connect(&mut self, login: &Login) -> Result<(), api::Error> {
        let logged_in = match login {
            Login::Interactive {
                tenant_id,
                client_id,
            } => api::login_interactive(&self.api, tenant_id.as_deref(), client_id).await?,
            Login::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => api::login(&self.api, tenant_id, client_id, client_secret).await?,
        };
        self.logged_in = Some(logged_in);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), api::Error> {
        if let Some(logged_in) = self.logged_in.take() {
            api::logout(logged_in);
        }
        Ok(())
    }

    async fn managed_devices(&self) -> Result<Vec<ManagedDevice>, api::Error> {
        match &self.logged_in {
            Some(logged_in) => api::managed_devices(logged_in).await,
            None => Err(api::Error::NotConnected),
        }
    }
}
