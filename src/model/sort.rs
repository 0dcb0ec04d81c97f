use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which field drives report ordering.
///
/// Reading a config never fails on this field: unknown names become
/// Item Default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum SortKey {
    #[default]
    ItemDefault,
    Brand,
    Blend,
    Type,
    Subgenre,
    Cut,
    Quantity,
    TinDefault,
    TinLabel,
    TinContainer,
    TinQuantity,
}

impl SortKey {
    /// The full catalog in display order
    pub const ALL: [SortKey; 11] = [
        SortKey::ItemDefault,
        SortKey::Brand,
        SortKey::Blend,
        SortKey::Type,
        SortKey::Subgenre,
        SortKey::Cut,
        SortKey::Quantity,
        SortKey::TinDefault,
        SortKey::TinLabel,
        SortKey::TinContainer,
        SortKey::TinQuantity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::ItemDefault => "Item Default",
            SortKey::Brand => "Brand",
            SortKey::Blend => "Blend",
            SortKey::Type => "Type",
            SortKey::Subgenre => "Subgenre",
            SortKey::Cut => "Cut",
            SortKey::Quantity => "Quantity",
            SortKey::TinDefault => "Tin Default",
            SortKey::TinLabel => "Tin Label",
            SortKey::TinContainer => "Tin Container",
            SortKey::TinQuantity => "Tin Quantity",
        }
    }

    /// The kebab-case name used in config files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            SortKey::ItemDefault => "item-default",
            SortKey::Brand => "brand",
            SortKey::Blend => "blend",
            SortKey::Type => "type",
            SortKey::Subgenre => "subgenre",
            SortKey::Cut => "cut",
            SortKey::Quantity => "quantity",
            SortKey::TinDefault => "tin-default",
            SortKey::TinLabel => "tin-label",
            SortKey::TinContainer => "tin-container",
            SortKey::TinQuantity => "tin-quantity",
        }
    }

    /// Whether this key orders tins rather than items
    pub fn is_tin_level(self) -> bool {
        matches!(
            self,
            SortKey::TinDefault | SortKey::TinLabel | SortKey::TinContainer | SortKey::TinQuantity
        )
    }

    /// Quantity keys read most-full-first; everything else reads A to Z
    pub fn default_ascending(self) -> bool {
        !matches!(self, SortKey::Quantity | SortKey::TinQuantity)
    }

    /// Parse a key, falling back to Item Default for anything unrecognized
    pub fn parse_or_default(s: &str) -> SortKey {
        s.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using item-default order");
            SortKey::default()
        })
    }
}

impl From<String> for SortKey {
    fn from(s: String) -> Self {
        SortKey::parse_or_default(&s)
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    /// Accepts either the display label ("Tin Label") or the kebab-case name
    /// ("tin-label"), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        SortKey::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSortKey(pub String);

/// Tiebreak applied after a tin-level primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum SubSort {
    /// Owning item's identity
    #[default]
    ItemDefault,
    /// The tin's own identity
    TinDefault,
    Brand,
    Blend,
}

impl SubSort {
    pub const ALL: [SubSort; 4] = [
        SubSort::ItemDefault,
        SubSort::TinDefault,
        SubSort::Brand,
        SubSort::Blend,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SubSort::ItemDefault => "Item Default",
            SubSort::TinDefault => "Tin Default",
            SubSort::Brand => "Brand",
            SubSort::Blend => "Blend",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SubSort::ItemDefault => "item-default",
            SubSort::TinDefault => "tin-default",
            SubSort::Brand => "brand",
            SubSort::Blend => "blend",
        }
    }

    /// Parse a tiebreak, falling back to the owning item's identity
    pub fn parse_or_default(s: &str) -> SubSort {
        s.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using item-default tiebreak");
            SubSort::default()
        })
    }
}

impl From<String> for SubSort {
    fn from(s: String) -> Self {
        SubSort::parse_or_default(&s)
    }
}

impl FromStr for SubSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        SubSort::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// A selected ordering: primary key, direction, and tin-level tiebreak.
///
/// `sub_sort` only has an effect when `key` is tin-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSortOption")]
pub struct SortOption {
    pub key: SortKey,
    pub ascending: bool,
    pub sub_sort: SubSort,
}

/// `[report.sort]` as written on disk; a missing `ascending` means the
/// key's natural direction
#[derive(Deserialize)]
struct StoredSortOption {
    #[serde(default)]
    key: SortKey,
    ascending: Option<bool>,
    #[serde(default)]
    sub_sort: SubSort,
}

impl From<StoredSortOption> for SortOption {
    fn from(stored: StoredSortOption) -> Self {
        SortOption {
            key: stored.key,
            ascending: stored.ascending.unwrap_or(stored.key.default_ascending()),
            sub_sort: stored.sub_sort,
        }
    }
}

impl SortOption {
    /// A sort on `key` in its natural direction
    pub fn new(key: SortKey) -> Self {
        SortOption {
            key,
            ascending: key.default_ascending(),
            sub_sort: SubSort::ItemDefault,
        }
    }

    pub fn with_ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub fn with_sub_sort(mut self, sub_sort: SubSort) -> Self {
        self.sub_sort = sub_sort;
        self
    }

    pub fn is_tin_primary(&self) -> bool {
        self.key.is_tin_level()
    }
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::new(SortKey::ItemDefault)
    }
}
