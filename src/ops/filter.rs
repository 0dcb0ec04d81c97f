use std::collections::BTreeSet;
use std::str::FromStr;

use regex::Regex;

use crate::model::item::{Item, Tin};

/// How a wanted set of component or flavoring names must match an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// At least one wanted name is present
    #[default]
    Any,
    /// Every wanted name is present; others may be too
    All,
    /// The item's names are exactly the wanted names
    Only,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(MatchMode::Any),
            "all" => Ok(MatchMode::All),
            "only" => Ok(MatchMode::Only),
            other => Err(format!("unknown match mode: {} (expected any, all, only)", other)),
        }
    }
}

/// Tin-level criteria. Tins that fail are removed from their item.
#[derive(Debug, Clone, Default)]
pub struct TinFilter {
    pub hide_finished: bool,
    /// Keep only these container types (case-insensitive); empty keeps all
    pub containers: Vec<String>,
    /// Drop items left with no tins
    pub has_tins: bool,
}

/// Item-level criteria. Empty lists and `None` mean "don't care".
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub brands: Vec<String>,
    pub types: Vec<String>,
    pub subgenres: Vec<String>,
    pub cuts: Vec<String>,
    pub favorites_only: bool,
    pub exclude_disliked: bool,
    /// `Some(true)` for in production only, `Some(false)` for discontinued
    pub in_production: Option<bool>,
    /// Matched against brand, blend, and notes
    pub search: Option<Regex>,
    pub components: Vec<String>,
    pub component_mode: MatchMode,
    pub flavorings: Vec<String>,
    pub flavoring_mode: MatchMode,
    pub tins: TinFilter,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
            && self.types.is_empty()
            && self.subgenres.is_empty()
            && self.cuts.is_empty()
            && !self.favorites_only
            && !self.exclude_disliked
            && self.in_production.is_none()
            && self.search.is_none()
            && self.components.is_empty()
            && self.flavorings.is_empty()
            && !self.tins.hide_finished
            && self.tins.containers.is_empty()
            && !self.tins.has_tins
    }

    /// Whether the item itself passes, ignoring its tins
    pub fn matches(&self, item: &Item) -> bool {
        one_of(&self.brands, &item.brand)
            && one_of(&self.types, &item.kind)
            && one_of(&self.subgenres, &item.subgenre)
            && one_of(&self.cuts, &item.cut)
            && (!self.favorites_only || item.favorite)
            && (!self.exclude_disliked || !item.disliked)
            && self.in_production.is_none_or(|p| item.in_production == p)
            && self.search.as_ref().is_none_or(|re| {
                re.is_match(&item.brand) || re.is_match(&item.blend) || re.is_match(&item.notes)
            })
            && names_match(&self.components, &item.components, self.component_mode)
            && names_match(&self.flavorings, &item.flavorings, self.flavoring_mode)
    }

    fn keeps_tin(&self, tin: &Tin) -> bool {
        (!self.tins.hide_finished || !tin.finished) && one_of(&self.tins.containers, &tin.container)
    }
}

/// Apply a filter, returning matching items with failing tins removed
pub fn filter_items(items: &[Item], filter: &ItemFilter) -> Vec<Item> {
    if filter.is_empty() {
        return items.to_vec();
    }

    let kept: Vec<Item> = items
        .iter()
        .filter(|item| filter.matches(item))
        .map(|item| {
            let mut item = item.clone();
            item.tins.retain(|t| filter.keeps_tin(t));
            item
        })
        .filter(|item| !filter.tins.has_tins || !item.tins.is_empty())
        .collect();

    tracing::debug!(before = items.len(), after = kept.len(), "filtered items");
    kept
}

fn one_of(wanted: &[String], value: &str) -> bool {
    wanted.is_empty() || wanted.iter().any(|w| w.eq_ignore_ascii_case(value.trim()))
}

fn names_match(wanted: &[String], have: &[String], mode: MatchMode) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let wanted: BTreeSet<String> = wanted.iter().map(|s| s.trim().to_lowercase()).collect();
    let have: BTreeSet<String> = have.iter().map(|s| s.trim().to_lowercase()).collect();
    match mode {
        MatchMode::Any => !wanted.is_disjoint(&have),
        MatchMode::All => wanted.is_subset(&have),
        MatchMode::Only => wanted == have,
    }
}
