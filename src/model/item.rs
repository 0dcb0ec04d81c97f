use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Grams per ounce, used to normalize tin weights
pub const GRAMS_PER_OZ: f64 = 28.3495;
/// Grams per pound, used to normalize tin weights
pub const GRAMS_PER_LB: f64 = 453.592;

/// Unit of measure on a tin's quantity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TinUnit {
    Oz,
    Lbs,
    Grams,
    /// Blank unit: the tin's amount is unspecified
    #[default]
    None,
    /// Anything else read from disk, kept verbatim
    Other(String),
}

impl TinUnit {
    /// The text shown after the amount in `@T_qty`
    pub fn label(&self) -> &str {
        match self {
            TinUnit::Oz => "oz",
            TinUnit::Lbs => "lbs",
            TinUnit::Grams => "grams",
            TinUnit::None => "",
            TinUnit::Other(s) => s,
        }
    }

    /// Grams per one unit, or `None` for blank/unknown units
    pub fn grams_per_unit(&self) -> Option<f64> {
        match self {
            TinUnit::Oz => Some(GRAMS_PER_OZ),
            TinUnit::Lbs => Some(GRAMS_PER_LB),
            TinUnit::Grams => Some(1.0),
            TinUnit::None | TinUnit::Other(_) => None,
        }
    }
}

impl From<String> for TinUnit {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" => TinUnit::None,
            "oz" | "ounce" | "ounces" => TinUnit::Oz,
            "lb" | "lbs" | "pound" | "pounds" => TinUnit::Lbs,
            "g" | "gram" | "grams" => TinUnit::Grams,
            _ => TinUnit::Other(s),
        }
    }
}

impl From<TinUnit> for String {
    fn from(unit: TinUnit) -> Self {
        unit.label().to_string()
    }
}

/// One physical container belonging to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tin {
    /// Identity key, unique within the collection
    pub id: u32,
    /// Identity key of the owning item
    #[serde(default)]
    pub item_id: u32,
    #[serde(default)]
    pub label: String,
    /// Container type (e.g. "Tin", "Jar", "Pouch"); blank if unknown
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: TinUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellar_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_date: Option<NaiveDate>,
    #[serde(default)]
    pub finished: bool,
}

impl Tin {
    pub fn new(id: u32, item_id: u32, label: &str) -> Self {
        Tin {
            id,
            item_id,
            label: label.to_string(),
            container: String::new(),
            quantity: 0.0,
            unit: TinUnit::None,
            manufacture_date: None,
            cellar_date: None,
            open_date: None,
            finished: false,
        }
    }

    /// Quantity converted to grams. Finished tins and tins without a
    /// recognized unit weigh nothing.
    pub fn normalized_grams(&self) -> f64 {
        if self.finished {
            return 0.0;
        }
        match self.unit.grams_per_unit() {
            Some(factor) => self.quantity * factor,
            None => 0.0,
        }
    }
}

/// One blend in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity key, unique within the collection
    pub id: u32,
    pub brand: String,
    pub blend: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subgenre: String,
    #[serde(default)]
    pub cut: String,
    #[serde(default = "default_true")]
    pub in_production: bool,
    /// Base count of units on hand (used when no tins are tracked)
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub disliked: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavorings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tins: Vec<Tin>,
}

fn default_true() -> bool {
    true
}

impl Item {
    /// Create a new in-production item with no tins or tags
    pub fn new(id: u32, brand: &str, blend: &str) -> Self {
        Item {
            id,
            brand: brand.to_string(),
            blend: blend.to_string(),
            kind: String::new(),
            subgenre: String::new(),
            cut: String::new(),
            in_production: true,
            quantity: 0,
            favorite: false,
            disliked: false,
            notes: String::new(),
            components: Vec::new(),
            flavorings: Vec::new(),
            tins: Vec::new(),
        }
    }

    /// Attach a tin, fixing up its back-reference to this item
    pub fn push_tin(&mut self, mut tin: Tin) {
        tin.item_id = self.id;
        self.tins.push(tin);
    }

    /// Point every owned tin's back-reference at this item
    pub fn link_tins(&mut self) {
        let id = self.id;
        for tin in &mut self.tins {
            tin.item_id = id;
        }
    }

    /// Text for `@prod`
    pub fn production_status(&self) -> &'static str {
        if self.in_production {
            "In Production"
        } else {
            "Discontinued"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parsing() {
        assert_eq!(TinUnit::from("OZ".to_string()), TinUnit::Oz);
        assert_eq!(TinUnit::from("lb".to_string()), TinUnit::Lbs);
        assert_eq!(TinUnit::from("g".to_string()), TinUnit::Grams);
        assert_eq!(TinUnit::from("  ".to_string()), TinUnit::None);
        assert_eq!(
            TinUnit::from("kg".to_string()),
            TinUnit::Other("kg".to_string())
        );
    }

    #[test]
    fn test_normalized_grams() {
        let mut tin = Tin::new(1, 1, "Lot 1");
        tin.quantity = 2.0;
        tin.unit = TinUnit::Oz;
        assert!((tin.normalized_grams() - 56.699).abs() < 1e-9);

        tin.unit = TinUnit::Lbs;
        tin.quantity = 1.0;
        assert!((tin.normalized_grams() - 453.592).abs() < 1e-9);

        tin.unit = TinUnit::Other("kg".into());
        assert_eq!(tin.normalized_grams(), 0.0);

        tin.unit = TinUnit::Grams;
        tin.quantity = 50.0;
        assert_eq!(tin.normalized_grams(), 50.0);
        tin.finished = true;
        assert_eq!(tin.normalized_grams(), 0.0);
    }

    #[test]
    fn test_push_tin_links_owner() {
        let mut item = Item::new(7, "Acme", "Flake");
        item.push_tin(Tin::new(1, 0, "Lot 1"));
        assert_eq!(item.tins[0].item_id, 7);
    }

    #[test]
    fn test_item_toml_defaults() {
        let text = r#"
id = 3
brand = "Acme"
blend = "Navy"
type = "Virginia"

[[tins]]
id = 10
label = "Lot 1"
quantity = 1.75
unit = "oz"
open_date = "2024-03-05"
"#;
        let mut item: Item = toml::from_str(text).unwrap();
        item.link_tins();
        assert_eq!(item.kind, "Virginia");
        assert!(item.in_production);
        assert_eq!(item.tins[0].item_id, 3);
        assert_eq!(item.tins[0].unit, TinUnit::Oz);
        assert_eq!(
            item.tins[0].open_date,
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }
}
