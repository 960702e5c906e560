use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub device_name: Option<String>,
    pub id: String,
    pub model: Option<String>,
    pub last_sync_date_time: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ManagedDevicesPage {
    pub value: Vec<Data>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}
