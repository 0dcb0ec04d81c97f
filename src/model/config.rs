use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sort::SortOption;

/// Number of preset slots (0 through 4)
pub const PRESET_SLOTS: u8 = 5;

/// Configuration from cellar/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellarConfig {
    #[serde(default)]
    pub collection: CollectionInfo,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
}

impl Default for CollectionInfo {
    fn default() -> Self {
        CollectionInfo {
            name: "cellar".to_string(),
        }
    }
}

/// Everything one render pass needs besides the data itself.
///
/// Passed explicitly to every render call; the host owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Format template (see `parse::template`)
    #[serde(default)]
    pub format: String,
    /// Inserted between records; `_n_` means a line break
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub sort: SortOption,
    #[serde(default)]
    pub quantity: QuantityDisplay,
}

/// Default: one record per line
fn default_delimiter() -> String {
    "_n_".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            format: String::new(),
            delimiter: default_delimiter(),
            sort: SortOption::default(),
            quantity: QuantityDisplay::default(),
        }
    }
}

/// A saved (format, delimiter) pair in one of the preset slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub slot: u8,
    #[serde(default)]
    pub name: String,
    pub format: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

/// How `@qty` is shown and how the item-level Quantity sort is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityDisplay {
    /// The item's base quantity count
    #[default]
    Count,
    /// Number of unfinished tins
    Tins,
    Ounces,
    Pounds,
    Grams,
}

impl QuantityDisplay {
    pub const ALL: [QuantityDisplay; 5] = [
        QuantityDisplay::Count,
        QuantityDisplay::Tins,
        QuantityDisplay::Ounces,
        QuantityDisplay::Pounds,
        QuantityDisplay::Grams,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QuantityDisplay::Count => "count",
            QuantityDisplay::Tins => "tins",
            QuantityDisplay::Ounces => "ounces",
            QuantityDisplay::Pounds => "pounds",
            QuantityDisplay::Grams => "grams",
        }
    }
}

impl FromStr for QuantityDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        QuantityDisplay::ALL
            .into_iter()
            .find(|q| q.name() == wanted)
            .ok_or_else(|| format!("unknown quantity display: {}", s))
    }
}

impl fmt::Display for QuantityDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sort::{SortKey, SubSort};

    #[test]
    fn test_config_defaults_from_minimal_toml() {
        let config: CellarConfig = toml::from_str("[collection]\nname = \"home\"\n").unwrap();
        assert_eq!(config.collection.name, "home");
        assert_eq!(config.report.delimiter, "_n_");
        assert_eq!(config.report.sort.key, SortKey::ItemDefault);
        assert!(config.presets.is_empty());
    }

    #[test]
    fn test_config_full_toml() {
        let text = r#"
[collection]
name = "home"

[report]
format = "@brand - @blend"
delimiter = ", "
quantity = "ounces"

[report.sort]
key = "tin-label"
ascending = false
sub_sort = "brand"

[[presets]]
slot = 2
name = "Tins"
format = "{@label~, }"
"#;
        let config: CellarConfig = toml::from_str(text).unwrap();
        assert_eq!(config.report.format, "@brand - @blend");
        assert_eq!(config.report.quantity, QuantityDisplay::Ounces);
        assert_eq!(config.report.sort.key, SortKey::TinLabel);
        assert!(!config.report.sort.ascending);
        assert_eq!(config.report.sort.sub_sort, SubSort::Brand);
        assert_eq!(config.presets[0].slot, 2);
        assert_eq!(config.presets[0].delimiter, "_n_");
    }

    #[test]
    fn test_unknown_sort_names_load_as_item_default() {
        let text = r#"
[report]
format = "@brand"

[report.sort]
key = "weight"
ascending = false
sub_sort = "vintage"
"#;
        let config: CellarConfig = toml::from_str(text).unwrap();
        assert_eq!(config.report.format, "@brand");
        assert_eq!(config.report.sort.key, SortKey::ItemDefault);
        assert!(!config.report.sort.ascending);
        assert_eq!(config.report.sort.sub_sort, SubSort::ItemDefault);
    }

    #[test]
    fn test_quantity_sort_without_direction_reads_heaviest_first() {
        let config: CellarConfig =
            toml::from_str("[report.sort]\nkey = \"tin-quantity\"\n").unwrap();
        assert_eq!(config.report.sort.key, SortKey::TinQuantity);
        assert!(!config.report.sort.ascending);

        let config: CellarConfig = toml::from_str("[report.sort]\nkey = \"brand\"\n").unwrap();
        assert!(config.report.sort.ascending);
    }
}
