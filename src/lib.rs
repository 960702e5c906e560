pub mod api;
pub mod connector;
pub mod credentials;
mod error;
pub mod export;
pub mod logger;
#[cfg(test)]
mod mock_session;
pub mod model;
pub mod retriever;
pub mod session;
pub mod settings;

pub use error::Error;
use export::ExportSummary;
use session::DeviceManagementSession;
use settings::Settings;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Exported(ExportSummary),
    /// The tenant has no managed devices; nothing was written.
    NoDevices,
}

async fn connect_retrieve_export<S: DeviceManagementSession>(
    session: &mut S,
    settings: &Settings,
) -> Result<RunOutcome, Error> {
    connector::connect(session, settings).await?;

    let devices = retriever::retrieve(&*session).await?;
    if devices.is_empty() {
        log::warn!("Skipping export, no devices to write");
        return Ok(RunOutcome::NoDevices);
    }

    export::export(&devices, &settings.output_directory).map(RunOutcome::Exported)
}

/// Connect, retrieve and export, then disconnect.
///
/// The disconnect runs exactly once on every path, whichever stage failed.
pub async fn run<S: DeviceManagementSession>(
    session: &mut S,
    settings: &Settings,
) -> Result<RunOutcome, Error> {
    let result = connect_retrieve_export(session, settings).await;

    match session.disconnect().await {
        Ok(()) => log::info!("Disconnected from Microsoft Graph"),
        Err(e) => log::warn!("Error while disconnecting: {:?}", e),
    }

    match &result {
        Ok(RunOutcome::Exported(summary)) => log::info!(
            "Script execution completed: {} devices in {}, {} rows in {}",
            summary.json_entries,
            summary.json_path.display(),
            summary.csv_rows,
            summary.csv_path.display()
        ),
        Ok(RunOutcome::NoDevices) => log::info!("Script execution completed without devices"),
        Err(e) => log::error!("Script execution failed: {}", e),
    }

    result
}
