//! Barangay settings

use std::sync::Arc;

use crate::error::{RecordsError, RecordsResult};
use crate::model::BarangaySettings;
use crate::store::{load_json, save_json, KeyValueStore};

/// Loads and saves [`BarangaySettings`] in the local store
pub struct SettingsPanel {
    store: Arc<dyn KeyValueStore>,
    settings: BarangaySettings,
}

impl SettingsPanel {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            settings: BarangaySettings::default(),
        }
    }

    /// Read stored settings; defaults when nothing was saved yet
    pub fn load(&mut self) -> RecordsResult<&BarangaySettings> {
        self.settings =
            load_json(self.store.as_ref(), BarangaySettings::STORAGE_KEY)?.unwrap_or_default();
        Ok(&self.settings)
    }

    pub fn settings(&self) -> &BarangaySettings {
        &self.settings
    }

    pub fn save(&mut self, settings: BarangaySettings) -> RecordsResult<()> {
        if settings.barangay_name.trim().is_empty() {
            return Err(RecordsError::Validation(
                "Barangay name is required".to_string(),
            ));
        }
        save_json(self.store.as_ref(), BarangaySettings::STORAGE_KEY, &settings)?;
        tracing::info!(barangay = %settings.barangay_name, "Settings saved");
        self.settings = settings;
        Ok(())
    }

    /// Update one field by name (`barangay_name`, `municipality`, `province`)
    pub fn set(&mut self, field: &str, value: &str) -> RecordsResult<()> {
        let mut updated = self.settings.clone();
        let slot = match field.replace('-', "_").as_str() {
            "barangay_name" | "barangayName" | "name" => &mut updated.barangay_name,
            "municipality" => &mut updated.municipality,
            "province" => &mut updated.province,
            other => {
                return Err(RecordsError::Validation(format!(
                    "Unknown settings field: {}",
                    other
                )))
            }
        };
        *slot = value.trim().to_string();
        self.save(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_then_save() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut panel = SettingsPanel::new(Arc::clone(&store));
        assert_eq!(panel.load().unwrap().municipality, "Dumangas");

        panel.set("province", "Capiz").unwrap();

        let mut reopened = SettingsPanel::new(store);
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.province, "Capiz");
        assert_eq!(loaded.barangay_name, "Barangay Pulao");
    }

    #[test]
    fn test_rejects_unknown_field_and_blank_name() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut panel = SettingsPanel::new(store);
        assert!(panel.set("mayor", "x").is_err());
        assert!(panel.set("barangay-name", " ").is_err());
    }
}
