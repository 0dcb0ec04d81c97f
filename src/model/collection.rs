use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::CellarConfig;
use super::item::{Item, Tin};

/// The contents of cellar/collection.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Collection {
    pub fn new(items: Vec<Item>) -> Self {
        let mut collection = Collection { items };
        collection.link_tins();
        collection
    }

    /// Repair tin back-references after deserializing
    pub fn link_tins(&mut self) {
        for item in &mut self.items {
            item.link_tins();
        }
    }

    pub fn find_item(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Every tin in the collection, in item order
    pub fn tins(&self) -> impl Iterator<Item = &Tin> {
        self.items.iter().flat_map(|i| i.tins.iter())
    }
}

/// A fully loaded cellar
#[derive(Debug)]
pub struct Cellar {
    /// Root directory (parent of `cellar/`)
    pub root: PathBuf,
    /// Path to the `cellar/` directory
    pub cellar_dir: PathBuf,
    /// Parsed config.toml
    pub config: CellarConfig,
    /// Parsed collection.toml
    pub collection: Collection,
}
