use crate::model::ManagedDevice;
use crate::session::DeviceManagementSession;
use crate::Error;

/// Fetch every managed device of the tenant. An empty tenant is logged but is not an error.
pub async fn retrieve<S: DeviceManagementSession>(
    session: &S,
) -> Result<Vec<ManagedDevice>, Error> {
    log::info!("Retrieving managed devices");

    match session.managed_devices().await {
        Ok(devices) if devices.is_empty() => {
            log::warn!("No managed devices found");
            Ok(devices)
        }
        Ok(devices) => {
            log::info!("Retrieved {} managed devices", devices.len());
            Ok(devices)
        }
        Err(e) => {
            log::error!("Failed to retrieve managed devices: {:?}", e);
            Err(Error::Retrieval(e))
        }
    }
}
