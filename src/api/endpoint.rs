pub type Endpoint = str;

pub const TOKEN: &Endpoint = "/oauth2/v2.0/token";
pub const DEVICE_CODE: &Endpoint = "/oauth2/v2.0/devicecode";
pub const MANAGED_DEVICES: &Endpoint = "/deviceManagement/managedDevices";

/// Projection requested from Graph; only these fields are exported.
pub const MANAGED_DEVICE_SELECT: &str = "deviceName,id,model,lastSyncDateTime";

/// Tenant segment used for interactive login when no tenant id is configured.
pub const ORGANIZATIONS: &str = "organizations";

pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const READ_DEVICES_SCOPE: &str =
    "https://graph.microsoft.com/DeviceManagementManagedDevices.Read.All";

pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";
pub const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

pub fn authority(authority_url: &str, tenant: &str, endpoint: &Endpoint) -> String {
    format!("{}/{}{}", authority_url.trim_end_matches('/'), tenant, endpoint)
}

pub fn managed_devices(graph_url: &str) -> String {
    format!(
        "{}{}?$select={}",
        graph_url.trim_end_matches('/'),
        MANAGED_DEVICES,
        MANAGED_DEVICE_SELECT
    )
}
