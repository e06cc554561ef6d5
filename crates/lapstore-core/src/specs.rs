use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "SSD+HDD")]
    SsdHdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphicsType {
    Integrated,
    Dedicated,
}

/// Which upgrade list an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Ram,
    Storage,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ram: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

impl UpgradeOptions {
    #[must_use]
    pub fn list(&self, kind: UpgradeKind) -> &[String] {
        match kind {
            UpgradeKind::Ram => &self.ram,
            UpgradeKind::Storage => &self.storage,
            UpgradeKind::Other => &self.other,
        }
    }

    fn list_mut(&mut self, kind: UpgradeKind) -> &mut Vec<String> {
        match kind {
            UpgradeKind::Ram => &mut self.ram,
            UpgradeKind::Storage => &mut self.storage,
            UpgradeKind::Other => &mut self.other,
        }
    }

    /// Appends `option` unless it is blank or already listed.
    pub fn add(&mut self, kind: UpgradeKind, option: &str) {
        let option = option.trim();
        if option.is_empty() {
            return;
        }
        let list = self.list_mut(kind);
        if !list.iter().any(|o| o == option) {
            list.push(option.to_string());
        }
    }

    pub fn remove(&mut self, kind: UpgradeKind, option: &str) {
        self.list_mut(kind).retain(|o| o != option);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ram.is_empty() && self.storage.is_empty() && self.other.is_empty()
    }
}

/// Structured laptop specification. Every field is optional; the form only
/// fills in what the seller knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedSpecs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_generation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_speed: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_upgradeable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ram: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_upgradeable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_storage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphics_type: Option<GraphicsType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphics_memory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display_features: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wireless: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "UpgradeOptions::is_empty")]
    pub upgrade_options: UpgradeOptions,
}

impl DetailedSpecs {
    /// `true` when nothing has been filled in, in which case the record is
    /// left out of the product payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
