use crate::credentials;
use crate::session::DeviceManagementSession;
use crate::settings::Settings;
use crate::Error;

/// Establish exactly one authenticated session.
///
/// Credentials are resolved (and a credential file read) before the network is touched. A
/// session left over from earlier is torn down first; failing to do so is only a warning.
pub async fn connect<S: DeviceManagementSession>(
    session: &mut S,
    settings: &Settings,
) -> Result<(), Error> {
    let login = credentials::resolve(settings)
        .and_then(|source| {
            log::info!("Using credentials: {:?}", source);
            credentials::login(source)
        })
        .map_err(|e| {
            log::error!("Credential setup failed: {:?}", e);
            e
        })?;

    if session.is_connected() {
        log::info!("Disconnecting existing session");
        if let Err(e) = session.disconnect().await {
            log::warn!("Could not disconnect existing session: {:?}", e);
        }
    }

    log::info!("Connecting to Microsoft Graph");
    match session.connect(&login).await {
        Ok(()) => {
            log::info!("Connected to Microsoft Graph");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to connect to Microsoft Graph: {:?}", e);
            Err(Error::Authentication(e.to_string()))
        }
    }
}
