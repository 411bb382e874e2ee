use serde::Deserialize;

use super::profile::Profile;

pub const DATA_SAVED: &str = "dataSaved";

/// Payload of the service's `dataSaved` push event.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSaved {
    #[serde(default)]
    pub user: Option<Profile>,
}
