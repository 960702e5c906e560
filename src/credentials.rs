//! Credential strategies and their resolution from settings.
//!
//! Everything here runs before any network call: a run with incomplete or conflicting
//! credential inputs fails without contacting the identity platform.

use crate::model::Login;
use crate::settings::Settings;
use crate::Error;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the session credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Interactive {
        tenant_id: Option<String>,
        client_id: String,
    },
    FromFile {
        tenant_id: String,
        path: PathBuf,
    },
    FromSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Interactive { tenant_id, .. } => {
                write!(f, "Interactive(tenant: {:?})", tenant_id)
            }
            CredentialSource::FromFile { tenant_id, path } => {
                write!(f, "FromFile(tenant: {}, path: {})", tenant_id, path.display())
            }
            CredentialSource::FromSecret {
                tenant_id,
                client_id,
                ..
            } => write!(f, "FromSecret(tenant: {}, client: {})", tenant_id, client_id),
        }
    }
}

/// On-disk application credential.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialFile {
    client_id: String,
    client_secret: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Pick the credential strategy from `settings`.
pub fn resolve(settings: &Settings) -> Result<CredentialSource, Error> {
    let tenant_id = non_empty(&settings.tenant_id);
    let client_id = non_empty(&settings.client_id);
    let client_secret = non_empty(&settings.client_secret);
    let path = settings.path.as_ref();

    if settings.use_interactive_login {
        if path.is_some() || client_secret.is_some() {
            return Err(Error::Authentication(
                "interactive login cannot be combined with service credentials".to_string(),
            ));
        }
        /* a supplied client id names the app registration to sign in through */
        return Ok(CredentialSource::Interactive {
            tenant_id: tenant_id.map(str::to_owned),
            client_id: client_id
                .unwrap_or(settings.interactive_client_id.as_str())
                .to_owned(),
        });
    }

    let tenant_id = tenant_id.ok_or_else(|| {
        Error::Authentication(
            "no credentials supplied: use interactive login or provide a tenant id with service credentials"
                .to_string(),
        )
    })?;

    match (path, client_id, client_secret) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::Authentication(
            "a credential file cannot be combined with client id/secret".to_string(),
        )),
        (Some(path), None, None) => Ok(CredentialSource::FromFile {
            tenant_id: tenant_id.to_owned(),
            path: path.to_owned(),
        }),
        (None, Some(client_id), Some(client_secret)) => Ok(CredentialSource::FromSecret {
            tenant_id: tenant_id.to_owned(),
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
        }),
        _ => Err(Error::Authentication(format!(
            "incomplete service credentials for tenant {}: provide a credential file or both client id and client secret",
            tenant_id
        ))),
    }
}

#[cfg(unix)]
fn warn_if_exposed(path: &Path, metadata: &fs::Metadata) {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o077 != 0 {
        log::warn!(
            "Credential file {} is readable by other users",
            path.display()
        );
    }
}

#[cfg(not(unix))]
fn warn_if_exposed(_path: &Path, _metadata: &fs::Metadata) {}

fn load_credential_file(path: &Path) -> Result<CredentialFile, Error> {
    let metadata = fs::metadata(path).map_err(|e| {
        Error::Authentication(format!(
            "credential file {} not found: {}",
            path.display(),
            e
        ))
    })?;
    warn_if_exposed(path, &metadata);

    let content = fs::read_to_string(path).map_err(|e| {
        Error::Authentication(format!(
            "credential file {} unreadable: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str::<CredentialFile>(&content).map_err(|e| {
        Error::Authentication(format!(
            "credential file {} is malformed: {}",
            path.display(),
            e
        ))
    })
}

/// Turn a credential source into a login request, reading the credential file if needed.
pub fn login(source: CredentialSource) -> Result<Login, Error> {
    match source {
        CredentialSource::Interactive {
            tenant_id,
            client_id,
        } => Ok(Login::Interactive {
            tenant_id,
            client_id,
        }),
        CredentialSource::FromFile { tenant_id, path } => {
            let file = load_credential_file(&path)?;
            log::info!(
                "Loaded credentials for application {} from {}",
                file.client_id,
                path.display()
            );
            Ok(Login::ClientSecret {
                tenant_id,
                client_id: file.client_id,
                client_secret: file.client_secret,
            })
        }
        CredentialSource::FromSecret {
            tenant_id,
            client_id,
            client_secret,
        } => Ok(Login::ClientSecret {
            tenant_id,
            client_id,
            client_secret,
        }),
    }
}
