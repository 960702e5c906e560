//! Fake device-management session recording every call, with failures injectable per stage.

use crate::api;
use crate::model::{Login, ManagedDevice};
use crate::session::DeviceManagementSession;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockSession {
    devices: Vec<ManagedDevice>,
    reject_login: bool,
    fail_listing: bool,
    connected: bool,
    pub logins: Vec<Login>,
    pub disconnects: usize,
    listings: AtomicUsize,
}

impl MockSession {
    pub fn with_devices(devices: Vec<ManagedDevice>) -> Self {
        MockSession {
            devices,
            ..Default::default()
        }
    }

    /// Session left connected by an earlier run.
    pub fn already_connected(devices: Vec<ManagedDevice>) -> Self {
        MockSession {
            devices,
            connected: true,
            ..Default::default()
        }
    }

    pub fn rejecting_login() -> Self {
        MockSession {
            reject_login: true,
            ..Default::default()
        }
    }

    pub fn failing_listing() -> Self {
        MockSession {
            fail_listing: true,
            ..Default::default()
        }
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceManagementSession for MockSession {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self, login: &Login) -> Result<(), api::Error> {
        self.logins.push(login.clone());
        if self.reject_login {
            return Err(api::Error::LoginError(
                "401 Unauthorized invalid_client: AADSTS7000215: Invalid client secret provided."
                    .to_string(),
            ));
        }
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), api::Error> {
        self.disconnects += 1;
        self.connected = false;
        Ok(())
    }

    async fn managed_devices(&self) -> Result<Vec<ManagedDevice>, api::Error> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if !self.connected {
            return Err(api::Error::NotConnected);
        }
        if self.fail_listing {
            return Err(api::Error::Forbidden(
                "403 Forbidden Forbidden: Application is not authorized to perform this operation."
                    .to_string(),
            ));
        }
        Ok(self.devices.clone())
    }
}
