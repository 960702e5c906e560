//! JSON and CSV exports of the device list.
//!
//! Both files are rewritten from scratch on every run. The CSV skips devices without a name,
//! the JSON keeps every device.

use crate::model::ManagedDevice;
use crate::Error;
use chrono::SecondsFormat;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const JSON_FILE_NAME: &str = "DevicePayload.json";
pub const CSV_FILE_NAME: &str = "DevicePayload.csv";
const CSV_HEADER: &str = "deviceName,id,model,lastSyncDateTime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub json_path: PathBuf,
    pub json_entries: usize,
    pub csv_path: PathBuf,
    pub csv_rows: usize,
}

fn export_err(path: PathBuf) -> impl FnOnce(io::Error) -> Error {
    move |source| {
        let error = Error::Export { path, source };
        log::error!("{:?}", error);
        error
    }
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Create `dir` (and parents) when missing.
pub fn prepare_output_directory(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir).map_err(|e| {
        let error = Error::Configuration(format!(
            "cannot create output directory {}: {}",
            dir.display(),
            e
        ));
        log::error!("{:?}", error);
        error
    })
}

pub fn write_json(devices: &[ManagedDevice], dir: &Path) -> Result<PathBuf, Error> {
    let path = dir.join(JSON_FILE_NAME);

    let write = || -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, devices)?;
        writeln!(writer)?;
        writer.flush()
    };
    write().map_err(export_err(path.clone()))?;

    log::info!("Wrote {} devices to {}", devices.len(), path.display());
    Ok(path)
}

/// Write named devices as CSV, returning the file and the number of data rows.
pub fn write_csv(devices: &[ManagedDevice], dir: &Path) -> Result<(PathBuf, usize), Error> {
    let path = dir.join(CSV_FILE_NAME);
    let named: Vec<&ManagedDevice> = devices.iter().filter(|d| d.has_name()).collect();

    let write = || -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{}", CSV_HEADER)?;
        for device in &named {
            writeln!(
                writer,
                "{},{},{},{}",
                escape_csv_field(device.device_name.as_deref().unwrap_or_default()),
                escape_csv_field(&device.id),
                escape_csv_field(device.model.as_deref().unwrap_or_default()),
                device
                    .last_sync_date_time
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true)
            )?;
        }
        writer.flush()
    };
    write().map_err(export_err(path.clone()))?;

    let skipped = devices.len() - named.len();
    if skipped > 0 {
        log::info!("Skipped {} devices without a name in CSV export", skipped);
    }
    log::info!("Wrote {} devices to {}", named.len(), path.display());
    Ok((path, named.len()))
}

/// Write both exports into `dir`, creating it if needed.
pub fn export(devices: &[ManagedDevice], dir: &Path) -> Result<ExportSummary, Error> {
    prepare_output_directory(dir)?;
    let json_path = write_json(devices, dir)?;
    let (csv_path, csv_rows) = write_csv(devices, dir)?;

    Ok(ExportSummary {
        json_path,
        json_entries: devices.len(),
        csv_path,
        csv_rows,
    })
}
