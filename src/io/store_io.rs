use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::collection::{Cellar, Collection};
use crate::model::config::CellarConfig;

/// Name of the data directory that marks a cellar root
pub const CELLAR_DIR: &str = "cellar";

/// Error type for cellar I/O operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a cellar: no cellar/ directory found")]
    NotACellar,
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("could not serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// Discover the cellar by walking up from the given directory, looking for
/// a `cellar/` subdirectory holding a config.toml.
pub fn discover_cellar(start: &Path) -> Result<PathBuf, StoreError> {
    let mut current = start.to_path_buf();
    loop {
        let cellar_dir = current.join(CELLAR_DIR);
        if cellar_dir.is_dir() && cellar_dir.join("config.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(StoreError::NotACellar);
        }
    }
}

/// Load config and collection from the given root directory.
pub fn load_cellar(root: &Path) -> Result<Cellar, StoreError> {
    let cellar_dir = root.join(CELLAR_DIR);
    if !cellar_dir.is_dir() {
        return Err(StoreError::NotACellar);
    }

    let config_path = cellar_dir.join("config.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| StoreError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: CellarConfig = toml::from_str(&config_text)?;

    let collection = load_collection(&cellar_dir)?;
    tracing::info!(
        root = %root.display(),
        items = collection.items.len(),
        presets = config.presets.len(),
        "loaded cellar"
    );

    Ok(Cellar {
        root: root.to_path_buf(),
        cellar_dir,
        config,
        collection,
    })
}

/// Load collection.toml; a missing file is an empty collection.
pub fn load_collection(cellar_dir: &Path) -> Result<Collection, StoreError> {
    let path = cellar_dir.join("collection.toml");
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no collection file");
        return Ok(Collection::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let mut collection: Collection = toml::from_str(&text)?;
    collection.link_tins();
    Ok(collection)
}

/// Save the collection back to disk
pub fn save_collection(cellar_dir: &Path, collection: &Collection) -> Result<(), StoreError> {
    let path = cellar_dir.join("collection.toml");
    let content = toml::to_string_pretty(collection)?;
    atomic_write(&path, content.as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), items = collection.items.len(), "wrote collection");
    Ok(())
}

/// Write via a temp file in the same directory, then rename over the target
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Item, Tin, TinUnit};
    use crate::model::sort::SortOption;
    use tempfile::TempDir;

    fn create_test_cellar(dir: &Path) {
        let cellar_dir = dir.join(CELLAR_DIR);
        fs::create_dir_all(&cellar_dir).unwrap();

        fs::write(
            cellar_dir.join("config.toml"),
            r#"
[collection]
name = "test"

[report]
format = "@brand"
"#,
        )
        .unwrap();

        fs::write(
            cellar_dir.join("collection.toml"),
            r#"
[[items]]
id = 1
brand = "Acme"
blend = "Navy"

[[items.tins]]
id = 1
label = "Lot 1"
quantity = 2.0
unit = "oz"
"#,
        )
        .unwrap();
    }

    #[test]
    fn test_discover_cellar() {
        let tmp = TempDir::new().unwrap();
        create_test_cellar(tmp.path());

        let root = discover_cellar(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());

        let sub = tmp.path().join("cellar");
        let root = discover_cellar(&sub).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn test_discover_cellar_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_cellar(tmp.path()).is_err());
    }

    #[test]
    fn test_load_cellar() {
        let tmp = TempDir::new().unwrap();
        create_test_cellar(tmp.path());

        let cellar = load_cellar(tmp.path()).unwrap();
        assert_eq!(cellar.config.collection.name, "test");
        assert_eq!(cellar.config.report.format, "@brand");
        assert_eq!(cellar.collection.items.len(), 1);
        let tin = &cellar.collection.items[0].tins[0];
        assert_eq!(tin.item_id, 1);
        assert_eq!(tin.unit, TinUnit::Oz);
    }

    #[test]
    fn test_load_cellar_with_unknown_sort_key() {
        let tmp = TempDir::new().unwrap();
        create_test_cellar(tmp.path());
        fs::write(
            tmp.path().join("cellar/config.toml"),
            "[report]\nformat = \"@brand\"\n\n[report.sort]\nkey = \"weight\"\n",
        )
        .unwrap();

        let cellar = load_cellar(tmp.path()).unwrap();
        assert_eq!(cellar.config.report.sort, SortOption::default());
        assert_eq!(cellar.collection.items.len(), 1);
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let tmp = TempDir::new().unwrap();
        create_test_cellar(tmp.path());
        fs::remove_file(tmp.path().join("cellar/collection.toml")).unwrap();
        let cellar = load_cellar(tmp.path()).unwrap();
        assert!(cellar.collection.items.is_empty());
    }

    #[test]
    fn test_save_and_reload_collection() {
        let tmp = TempDir::new().unwrap();
        create_test_cellar(tmp.path());
        let cellar_dir = tmp.path().join(CELLAR_DIR);

        let mut item = Item::new(5, "Bell", "Mix");
        item.components = vec!["Latakia".into()];
        let mut tin = Tin::new(9, 0, "Jar 1");
        tin.unit = TinUnit::Grams;
        tin.quantity = 100.0;
        item.push_tin(tin);
        let collection = Collection::new(vec![item]);

        save_collection(&cellar_dir, &collection).unwrap();
        let loaded = load_collection(&cellar_dir).unwrap();
        assert_eq!(loaded.items, collection.items);
    }
}
