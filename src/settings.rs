use crate::Error;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";
/// Public client id of the Microsoft Graph command line tools, used for interactive sign-in.
pub const INTERACTIVE_CLIENT_ID: &str = "14d82eec-204b-4c2f-b7e8-296a70dab67e";
pub const LOG_FILE_NAME: &str = "DeviceExport.log";
pub const ENV_PREFIX: &str = "IDE";
const REQUEST_TIMEOUT_SECS: i64 = 60;

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub tenant_id: Option<String>,
    /// Credential file holding the application id and secret.
    pub path: Option<PathBuf>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub use_interactive_login: bool,
    pub log_path: PathBuf,
    pub output_directory: PathBuf,
    pub authority_url: String,
    pub graph_url: String,
    pub interactive_client_id: String,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tenant_id", &self.tenant_id)
            .field("path", &self.path)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("use_interactive_login", &self.use_interactive_login)
            .field("log_path", &self.log_path)
            .field("output_directory", &self.output_directory)
            .field("authority_url", &self.authority_url)
            .field("graph_url", &self.graph_url)
            .field("interactive_client_id", &self.interactive_client_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Directory holding the running executable; default home of the log and the exports.
pub fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Layer defaults, an optional config file, `IDE_*` environment variables and `overrides`
/// (command line values), later layers winning.
pub fn read_settings(
    base_dir: &Path,
    config_file: Option<&Path>,
    overrides: &[(&str, String)],
) -> Result<Settings, Error> {
    let mut settings = Config::default();
    settings
        .set_default(
            "log_path",
            base_dir.join(LOG_FILE_NAME).to_string_lossy().to_string(),
        )?
        .set_default("output_directory", base_dir.to_string_lossy().to_string())?
        .set_default("authority_url", AUTHORITY_URL)?
        .set_default("graph_url", GRAPH_URL)?
        .set_default("interactive_client_id", INTERACTIVE_CLIENT_ID)?
        .set_default("request_timeout_secs", REQUEST_TIMEOUT_SECS)?
        .set_default("use_interactive_login", false)?;

    if let Some(path) = config_file {
        settings.merge(File::from(path))?;
    }
    settings.merge(Environment::with_prefix(ENV_PREFIX))?;

    for (key, value) in overrides {
        settings.set(key, value.as_str())?;
    }

    settings.try_into::<Settings>().map_err(Error::from)
}
