use serde::{Deserialize, Serialize};

/// Settings the browser/terminal client needs, served from `GET /config`.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub google_maps_api_key: String,
}

impl ClientConfig {
    /// Without a key the map view renders nothing instead of failing.
    pub fn map_enabled(&self) -> bool {
        !self.google_maps_api_key.trim().is_empty()
    }
}
