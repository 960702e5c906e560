use clap::Parser;
use std::path::PathBuf;

/// Export Intune managed devices from Microsoft Graph to JSON and CSV
#[derive(Parser)]
#[command(name = "intune-device-export", version)]
pub struct Cli {
    /// Tenant (directory) id; required for service credentials
    #[arg(long)]
    pub tenant_id: Option<String>,

    /// Credential file with the application's clientId and clientSecret
    #[arg(long, value_name = "FILE", conflicts_with_all = ["client_id", "client_secret"])]
    pub path: Option<PathBuf>,

    /// Application (client) id; with interactive login, the app registration to sign in through
    #[arg(long)]
    pub client_id: Option<String>,

    /// Application client secret
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Sign in interactively with the device code flow
    #[arg(long, conflicts_with_all = ["path", "client_secret"])]
    pub use_interactive_login: bool,

    /// Session log file [default: DeviceExport.log beside the executable]
    #[arg(long, value_name = "FILE")]
    pub log_path: Option<PathBuf>,

    /// Directory receiving DevicePayload.json and DevicePayload.csv [default: executable's directory]
    #[arg(long, value_name = "DIR")]
    pub output_directory: Option<PathBuf>,

    /// Optional configuration file (toml, json, yaml, ini)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Command line values as settings overrides, keyed like the settings fields.
    pub fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();

        let text = [
            ("tenant_id", self.tenant_id.clone()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];
        let paths = [
            ("path", self.path.as_ref()),
            ("log_path", self.log_path.as_ref()),
            ("output_directory", self.output_directory.as_ref()),
        ];

        for (key, value) in text {
            if let Some(value) = value {
                overrides.push((key, value));
            }
        }
        for (key, value) in paths {
            if let Some(value) = value {
                overrides.push((key, value.to_string_lossy().to_string()));
            }
        }
        if self.use_interactive_login {
            overrides.push(("use_interactive_login", "true".to_string()));
        }

        overrides
    }
}
