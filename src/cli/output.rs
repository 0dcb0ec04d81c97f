use serde::Serialize;

use crate::model::config::{Preset, ReportConfig};
use crate::model::item::{Item, Tin};
use crate::model::sort::SortKey;
use crate::parse::token::{Token, TokenContext};
use crate::util::table::format_table;

/// Widest a `list` column may grow before it is truncated
const MAX_COLUMN: usize = 32;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: u32,
    pub brand: String,
    pub blend: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub subgenre: String,
    pub cut: String,
    pub in_production: bool,
    pub quantity: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flavorings: Vec<String>,
    pub tins: Vec<TinJson>,
}

#[derive(Serialize)]
pub struct TinJson {
    pub id: u32,
    pub label: String,
    pub container: String,
    pub quantity: f64,
    pub unit: String,
    pub finished: bool,
}

#[derive(Serialize)]
pub struct ReportJson<'a> {
    pub format: &'a str,
    pub delimiter: &'a str,
    pub sort: String,
    pub ascending: bool,
    pub text: String,
    pub preview: String,
}

#[derive(Serialize)]
pub struct SortKeyJson {
    pub name: &'static str,
    pub label: &'static str,
    pub tin_level: bool,
    pub default_ascending: bool,
}

#[derive(Serialize)]
pub struct TokenJson {
    pub token: &'static str,
    pub context: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct PresetJson {
    pub slot: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

#[derive(Serialize)]
pub struct ConfigJson<'a> {
    pub collection: &'a str,
    pub format: &'a str,
    pub delimiter: &'a str,
    pub sort: &'static str,
    pub ascending: bool,
    pub sub_sort: &'static str,
    pub quantity: &'static str,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn tin_to_json(tin: &Tin) -> TinJson {
    TinJson {
        id: tin.id,
        label: tin.label.clone(),
        container: tin.container.clone(),
        quantity: tin.quantity,
        unit: tin.unit.label().to_string(),
        finished: tin.finished,
    }
}

pub fn item_to_json(item: &Item, quantity: &str) -> ItemJson {
    ItemJson {
        id: item.id,
        brand: item.brand.clone(),
        blend: item.blend.clone(),
        kind: item.kind.clone(),
        subgenre: item.subgenre.clone(),
        cut: item.cut.clone(),
        in_production: item.in_production,
        quantity: quantity.to_string(),
        components: item.components.clone(),
        flavorings: item.flavorings.clone(),
        tins: item.tins.iter().map(tin_to_json).collect(),
    }
}

pub fn sort_key_to_json(key: SortKey) -> SortKeyJson {
    SortKeyJson {
        name: key.name(),
        label: key.label(),
        tin_level: key.is_tin_level(),
        default_ascending: key.default_ascending(),
    }
}

fn context_name(context: TokenContext) -> &'static str {
    match context {
        TokenContext::Item => "item",
        TokenContext::Tin => "tin",
    }
}

pub fn token_to_json(token: Token) -> TokenJson {
    TokenJson {
        token: token.spelling(),
        context: context_name(token.context()),
        description: token.description(),
    }
}

pub fn preset_to_json(slot: u8, preset: Option<&Preset>) -> PresetJson {
    PresetJson {
        slot,
        name: preset.map(|p| p.name.clone()),
        format: preset.map(|p| p.format.clone()),
        delimiter: preset.map(|p| p.delimiter.clone()),
    }
}

pub fn config_to_json<'a>(collection: &'a str, report: &'a ReportConfig) -> ConfigJson<'a> {
    ConfigJson {
        collection,
        format: &report.format,
        delimiter: &report.delimiter,
        sort: report.sort.key.name(),
        ascending: report.sort.ascending,
        sub_sort: report.sort.sub_sort.name(),
        quantity: report.quantity.name(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Item table for `cellar list`. `quantity` looks up the display string.
pub fn format_item_table<'a>(items: &[&Item], quantity: impl Fn(u32) -> &'a str) -> String {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            let open = item.tins.iter().filter(|t| !t.finished).count();
            vec![
                item.id.to_string(),
                item.brand.clone(),
                item.blend.clone(),
                item.kind.clone(),
                quantity(item.id).to_string(),
                format!("{}/{}", open, item.tins.len()),
            ]
        })
        .collect();
    format_table(&["ID", "BRAND", "BLEND", "TYPE", "QTY", "TINS"], &rows, MAX_COLUMN)
}

pub fn format_sort_keys(keys: &[SortKey], current: SortKey) -> String {
    let rows: Vec<Vec<String>> = keys
        .iter()
        .map(|&k| {
            let marker = if k == current { "*" } else { "" };
            let level = if k.is_tin_level() { "tin" } else { "item" };
            vec![
                marker.to_string(),
                k.name().to_string(),
                k.label().to_string(),
                level.to_string(),
            ]
        })
        .collect();
    format_table(&["", "NAME", "LABEL", "LEVEL"], &rows, MAX_COLUMN)
}

pub fn format_tokens() -> String {
    let rows: Vec<Vec<String>> = Token::ALL
        .iter()
        .map(|&t| {
            vec![
                t.spelling().to_string(),
                context_name(t.context()).to_string(),
                t.description().to_string(),
            ]
        })
        .collect();
    format_table(&["TOKEN", "CONTEXT", "DESCRIPTION"], &rows, 48)
}

pub fn format_presets(slots: &[(u8, Option<&Preset>)]) -> String {
    let rows: Vec<Vec<String>> = slots
        .iter()
        .map(|(slot, preset)| match preset {
            Some(p) => vec![slot.to_string(), p.name.clone(), p.format.clone()],
            None => vec![slot.to_string(), "(empty)".to_string(), String::new()],
        })
        .collect();
    format_table(&["SLOT", "NAME", "FORMAT"], &rows, 48)
}

pub fn format_config(collection: &str, report: &ReportConfig) -> String {
    let direction = if report.sort.ascending { "ascending" } else { "descending" };
    let mut out = String::new();
    out.push_str(&format!("collection: {}\n", collection));
    out.push_str(&format!("format:     {}\n", report.format));
    out.push_str(&format!("delimiter:  {}\n", report.delimiter));
    out.push_str(&format!("sort:       {} ({})", report.sort.key.label(), direction));
    if report.sort.is_tin_primary() {
        out.push_str(&format!(", then {}", report.sort.sub_sort.label()));
    }
    out.push('\n');
    out.push_str(&format!("quantity:   {}\n", report.quantity));
    out
}
