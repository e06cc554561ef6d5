use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftCategory {
    Bag,
    Keyboard,
    Mouse,
    Keyguard,
    Mousepad,
    Stand,
    Cleaning,
    Airpods,
    Watch,
    Other,
}

impl GiftCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GiftCategory::Bag => "Bag",
            GiftCategory::Keyboard => "Keyboard",
            GiftCategory::Mouse => "Mouse",
            GiftCategory::Keyguard => "Keyguard",
            GiftCategory::Mousepad => "Mouse Pad",
            GiftCategory::Stand => "Laptop Stand",
            GiftCategory::Cleaning => "Cleaning Kit",
            GiftCategory::Airpods => "AirPods",
            GiftCategory::Watch => "Watch",
            GiftCategory::Other => "Other",
        }
    }
}

/// A freebie bundled with a laptop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeGift {
    pub id: String,
    pub name: String,
    pub category: GiftCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `true` for catalog presets, `false` for gifts typed in by the seller.
    #[serde(default)]
    pub is_default: bool,
}

impl FreeGift {
    /// A seller-defined gift with a freshly generated id.
    ///
    /// Returns `None` when `name` is blank.
    #[must_use]
    pub fn custom(name: &str, category: GiftCategory, description: Option<&str>) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(ToOwned::to_owned),
            is_default: false,
        })
    }

    fn preset(id: &str, name: &str, category: GiftCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            description: None,
            is_default: true,
        }
    }
}

/// The built-in quick-add gifts.
#[must_use]
pub fn preset_gifts() -> Vec<FreeGift> {
    vec![
        FreeGift::preset("1", "Laptop Bag (Handbag)", GiftCategory::Bag),
        FreeGift::preset("2", "Laptop Bag (Pitthu)", GiftCategory::Bag),
        FreeGift::preset("3", "Wireless Keyboard", GiftCategory::Keyboard),
        FreeGift::preset("4", "Gaming Mouse", GiftCategory::Mouse),
        FreeGift::preset("5", "Keyboard Cover", GiftCategory::Keyguard),
        FreeGift::preset("6", "Gaming Mouse Pad", GiftCategory::Mousepad),
        FreeGift::preset("7", "Adjustable Laptop Stand", GiftCategory::Stand),
        FreeGift::preset("8", "Screen Cleaning Kit", GiftCategory::Cleaning),
        FreeGift::preset("9", "AirPods Pro", GiftCategory::Airpods),
        FreeGift::preset("10", "Smart Watch", GiftCategory::Watch),
    ]
}

/// Adds `gift` when no gift with its id is selected, removes it otherwise.
pub fn toggle_gift(gifts: &mut Vec<FreeGift>, gift: FreeGift) {
    if let Some(pos) = gifts.iter().position(|g| g.id == gift.id) {
        gifts.remove(pos);
    } else {
        gifts.push(gift);
    }
}

/// Appends `gift` unless its id is already taken.
pub fn add_gift(gifts: &mut Vec<FreeGift>, gift: FreeGift) {
    if !gifts.iter().any(|g| g.id == gift.id) {
        gifts.push(gift);
    }
}

pub fn remove_gift(gifts: &mut Vec<FreeGift>, gift_id: &str) {
    gifts.retain(|g| g.id != gift_id);
}

#[derive(Debug, Deserialize)]
pub struct GiftsFile {
    pub gifts: Vec<FreeGift>,
}

/// Load and validate the quick-add gift presets from a YAML file.
///
/// Every loaded gift is marked as a preset regardless of what the file says.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_gift_presets(path: &Path) -> Result<Vec<FreeGift>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::GiftsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut gifts_file: GiftsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::GiftsFileParse)?;

    validate_presets(&gifts_file)?;

    for gift in &mut gifts_file.gifts {
        gift.is_default = true;
    }

    Ok(gifts_file.gifts)
}

fn validate_presets(gifts_file: &GiftsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for gift in &gifts_file.gifts {
        if gift.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "gift '{}' has an empty id",
                gift.name
            )));
        }

        if gift.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "gift '{}' has an empty name",
                gift.id
            )));
        }

        if !seen_ids.insert(gift.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate gift id: '{}'",
                gift.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "gifts_test.rs"]
mod tests;
