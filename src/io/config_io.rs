use std::fs;
use std::path::Path;

use crate::io::store_io::{StoreError, atomic_write};
use crate::model::config::{CellarConfig, Preset, QuantityDisplay};
use crate::model::sort::SortOption;

/// Read the cellar config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(cellar_dir: &Path) -> Result<(CellarConfig, toml_edit::DocumentMut), StoreError> {
    let config_path = cellar_dir.join("config.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| StoreError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: CellarConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(cellar_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), StoreError> {
    let config_path = cellar_dir.join("config.toml");
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| StoreError::WriteError {
        path: config_path.clone(),
        source: e,
    })?;
    tracing::info!(path = %config_path.display(), "wrote config");
    Ok(())
}

fn report_table(doc: &mut toml_edit::DocumentMut) -> &mut toml_edit::Item {
    if !doc.contains_key("report") {
        doc["report"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    &mut doc["report"]
}

/// Update the report format string
pub fn set_format(doc: &mut toml_edit::DocumentMut, format: &str) {
    report_table(doc)["format"] = toml_edit::value(format);
}

/// Update the record delimiter
pub fn set_delimiter(doc: &mut toml_edit::DocumentMut, delimiter: &str) {
    report_table(doc)["delimiter"] = toml_edit::value(delimiter);
}

/// Update the quantity display mode
pub fn set_quantity(doc: &mut toml_edit::DocumentMut, quantity: QuantityDisplay) {
    report_table(doc)["quantity"] = toml_edit::value(quantity.name());
}

/// Replace the `[report.sort]` table
pub fn set_sort(doc: &mut toml_edit::DocumentMut, sort: &SortOption) {
    let report = report_table(doc);
    let mut table = toml_edit::Table::new();
    table["key"] = toml_edit::value(sort.key.name());
    table["ascending"] = toml_edit::value(sort.ascending);
    table["sub_sort"] = toml_edit::value(sort.sub_sort.name());
    report["sort"] = toml_edit::Item::Table(table);
}

/// Insert a preset, or overwrite the one already in its slot
pub fn upsert_preset(doc: &mut toml_edit::DocumentMut, preset: &Preset) {
    if !doc.contains_key("presets") {
        doc["presets"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }

    if let Some(presets) = doc["presets"].as_array_of_tables_mut() {
        let wanted = Some(i64::from(preset.slot));
        let found = presets
            .iter()
            .position(|t| t.get("slot").and_then(|v| v.as_integer()) == wanted);
        let index = match found {
            Some(index) => index,
            None => {
                let mut table = toml_edit::Table::new();
                table["slot"] = toml_edit::value(i64::from(preset.slot));
                presets.push(table);
                presets.len() - 1
            }
        };
        let Some(table) = presets.get_mut(index) else {
            return;
        };
        table["name"] = toml_edit::value(&preset.name);
        table["format"] = toml_edit::value(&preset.format);
        table["delimiter"] = toml_edit::value(&preset.delimiter);
    }
}

/// Remove the preset in `slot`, if any
pub fn remove_preset(doc: &mut toml_edit::DocumentMut, slot: u8) {
    if let Some(presets) = doc
        .get_mut("presets")
        .and_then(|p| p.as_array_of_tables_mut())
    {
        presets.retain(|t| t.get("slot").and_then(|v| v.as_integer()) != Some(i64::from(slot)));
    }
}
