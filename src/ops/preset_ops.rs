use crate::io::config_io;
use crate::model::config::{CellarConfig, PRESET_SLOTS, Preset};

/// Error type for preset operations
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("invalid preset slot {0}: expected 0-{max}", max = PRESET_SLOTS - 1)]
    InvalidSlot(u8),
    #[error("preset slot {0} is empty")]
    EmptySlot(u8),
}

fn check_slot(slot: u8) -> Result<(), PresetError> {
    if slot < PRESET_SLOTS {
        Ok(())
    } else {
        Err(PresetError::InvalidSlot(slot))
    }
}

/// Save the config's current format and delimiter into `slot`,
/// overwriting whatever was there.
pub fn save_preset(
    doc: &mut toml_edit::DocumentMut,
    config: &mut CellarConfig,
    slot: u8,
    name: &str,
) -> Result<Preset, PresetError> {
    check_slot(slot)?;
    let preset = Preset {
        slot,
        name: name.to_string(),
        format: config.report.format.clone(),
        delimiter: config.report.delimiter.clone(),
    };

    config_io::upsert_preset(doc, &preset);
    match config.presets.iter_mut().find(|p| p.slot == slot) {
        Some(existing) => *existing = preset.clone(),
        None => {
            config.presets.push(preset.clone());
            config.presets.sort_by_key(|p| p.slot);
        }
    }
    tracing::info!(slot, name, "saved preset");
    Ok(preset)
}

/// The preset saved in `slot`
pub fn get_preset(config: &CellarConfig, slot: u8) -> Result<&Preset, PresetError> {
    check_slot(slot)?;
    config
        .presets
        .iter()
        .find(|p| p.slot == slot)
        .ok_or(PresetError::EmptySlot(slot))
}

/// Make the preset in `slot` the active format and delimiter
pub fn load_preset(
    doc: &mut toml_edit::DocumentMut,
    config: &mut CellarConfig,
    slot: u8,
) -> Result<Preset, PresetError> {
    let preset = get_preset(config, slot)?.clone();

    config.report.format = preset.format.clone();
    config.report.delimiter = preset.delimiter.clone();
    config_io::set_format(doc, &preset.format);
    config_io::set_delimiter(doc, &preset.delimiter);
    tracing::info!(slot, name = preset.name.as_str(), "loaded preset");
    Ok(preset)
}

/// Clear `slot`
pub fn delete_preset(
    doc: &mut toml_edit::DocumentMut,
    config: &mut CellarConfig,
    slot: u8,
) -> Result<(), PresetError> {
    check_slot(slot)?;
    if !config.presets.iter().any(|p| p.slot == slot) {
        return Err(PresetError::EmptySlot(slot));
    }
    config.presets.retain(|p| p.slot != slot);
    config_io::remove_preset(doc, slot);
    tracing::info!(slot, "deleted preset");
    Ok(())
}

/// All five slots in order, `None` where empty. Out-of-range slots read
/// from disk are ignored.
pub fn list_presets(config: &CellarConfig) -> Vec<(u8, Option<&Preset>)> {
    (0..PRESET_SLOTS)
        .map(|slot| (slot, config.presets.iter().find(|p| p.slot == slot)))
        .collect()
}
