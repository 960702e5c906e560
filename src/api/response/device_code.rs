use serde::Deserialize;

#[derive(Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Human readable sign-in instructions, shown to the user as-is.
    pub message: String,
}

fn default_interval() -> u64 {
    5
}
