use serde::{Deserialize, Serialize};

/// Barangay identity shown on headers and printed documents.
///
/// Lives only in the local store under [`BarangaySettings::STORAGE_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BarangaySettings {
    pub barangay_name: String,
    pub municipality: String,
    pub province: String,
}

impl BarangaySettings {
    pub const STORAGE_KEY: &'static str = "barangaySettings";
}

impl Default for BarangaySettings {
    fn default() -> Self {
        Self {
            barangay_name: "Barangay Pulao".to_string(),
            municipality: "Dumangas".to_string(),
            province: "Iloilo".to_string(),
        }
    }
}
