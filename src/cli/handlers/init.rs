use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::store_io::{self, CELLAR_DIR};
use crate::model::collection::Collection;
use crate::ops::sample::sample_items;

const CONFIG_TOML_TEMPLATE: &str = r##"[collection]
name = "{name}"

# --- Report ---
# Placeholders start with @ (see: cellar tokens).
# [ ... ] drops its contents when nothing inside resolves to a value.
# { ... ~sep } repeats its contents once per tin, joined by sep.
# # numbers each line; ## zero-pads to two digits.
# '<symbol> writes a reserved symbol literally.
[report]
format = "@brand - @blend[ (@type)]"
delimiter = "_n_"
quantity = "count"

[report.sort]
key = "item-default"
ascending = true
sub_sort = "item-default"

# --- Presets ---
# Five slots (0-4). Save with: cellar preset save <slot> "name"
#
# [[presets]]
# slot = 0
# name = "Tin list"
# format = "@brand - @blend {@label (@T_qty)~, }"
# delimiter = "_n_"
"##;

const COLLECTION_TEMPLATE: &str = "# Items and their tins. Each [[items]] may hold [[items.tins]] entries.\n";

/// Infer a collection name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let cellar_dir = cwd.join(CELLAR_DIR);

    if cellar_dir.is_dir() && !args.force {
        return Err("cellar already exists in ./cellar/ (use --force to reinitialize)".into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = store_io::discover_cellar(parent)
    {
        eprintln!(
            "Note: parent cellar found at {}/",
            parent_root.join(CELLAR_DIR).display()
        );
        eprintln!("Creating new cellar in ./cellar/");
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Cellar".to_string())
    });

    fs::create_dir_all(&cellar_dir)?;
    let config = CONFIG_TOML_TEMPLATE.replace("{name}", &name.replace('"', "\\\""));
    store_io::atomic_write(&cellar_dir.join("config.toml"), config.as_bytes())?;

    if args.sample {
        store_io::save_collection(&cellar_dir, &Collection::new(sample_items()))?;
    } else {
        store_io::atomic_write(
            &cellar_dir.join("collection.toml"),
            COLLECTION_TEMPLATE.as_bytes(),
        )?;
    }

    tracing::info!(name = name.as_str(), sample = args.sample, "initialized cellar");
    println!("Initialized cellar \"{}\" in ./{}/", name, CELLAR_DIR);
    Ok(())
}
