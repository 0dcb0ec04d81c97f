use cellar::io::store_io::{self, CELLAR_DIR};
use cellar::model::collection::Collection;
use cellar::model::config::{QuantityDisplay, ReportConfig};
use cellar::model::item::{Item, Tin, TinUnit};
use cellar::model::sort::{SortKey, SortOption, SubSort};
use cellar::ops::filter::{ItemFilter, TinFilter, filter_items};
use cellar::ops::render::{render_items, render_report};
use cellar::ops::sample::sample_items;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use std::fs;

fn config(format: &str, sort: SortOption) -> ReportConfig {
    ReportConfig {
        format: format.to_string(),
        delimiter: "_n_".to_string(),
        sort,
        quantity: QuantityDisplay::Count,
    }
}

/// Write a collection into a fresh cellar and load it back the way the CLI does
fn stored_collection(items: Vec<Item>) -> Collection {
    let tmp = tempfile::TempDir::new().unwrap();
    let cellar_dir = tmp.path().join(CELLAR_DIR);
    fs::create_dir_all(&cellar_dir).unwrap();
    fs::write(cellar_dir.join("config.toml"), "[collection]\nname = \"t\"\n").unwrap();
    store_io::save_collection(&cellar_dir, &Collection::new(items)).unwrap();
    store_io::load_cellar(tmp.path()).unwrap().collection
}

fn aged_collection() -> Vec<Item> {
    let mut nightcap = Item::new(1, "Dunhill", "Nightcap");
    let mut old = Tin::new(1, 1, "2019");
    old.finished = true;
    let mut newer = Tin::new(2, 1, "2021");
    newer.quantity = 50.0;
    newer.unit = TinUnit::Grams;
    nightcap.push_tin(old);
    nightcap.push_tin(newer);

    let haddo = Item::new(2, "G. L. Pease", "Haddo's Delight");
    vec![nightcap, haddo]
}

#[test]
fn tin_report_over_sample() {
    let report = render_items(
        &sample_items(),
        &config(
            "##. @label: @brand @blend[ (@T_qty)][, cellared @cellar]",
            SortOption::new(SortKey::TinLabel),
        ),
    );
    assert_snapshot!(report, @r"
    01. Bulk: Cornell & Diehl Pirate Kake (1 lbs), cellared Sep 30, 2022
    02. Lot 1: Sutliff Maple Shadows (1.5 oz), cellared Apr 2, 2023
    03. Lot 2: Sutliff Maple Shadows (50 grams)
    ");
}

#[test]
fn descending_tin_report_is_exact_reverse() {
    let format = "@label";
    let up = render_items(
        &sample_items(),
        &config(format, SortOption::new(SortKey::TinContainer).with_ascending(true)),
    );
    let down = render_items(
        &sample_items(),
        &config(format, SortOption::new(SortKey::TinContainer).with_ascending(false)),
    );
    let mut reversed: Vec<&str> = up.lines().collect();
    reversed.reverse();
    assert_eq!(down.lines().collect::<Vec<_>>(), reversed);
}

#[test]
fn sub_sort_breaks_tin_ties() {
    let mut items = sample_items();
    for tin in items.iter_mut().flat_map(|i| i.tins.iter_mut()) {
        tin.container = "Tin".into();
    }
    let report = render_items(
        &items,
        &config(
            "@brand / @label",
            SortOption::new(SortKey::TinContainer).with_sub_sort(SubSort::Brand),
        ),
    );
    assert_eq!(
        report,
        "Cornell & Diehl / Bulk\nSutliff / Lot 1\nSutliff / Lot 2"
    );
}

#[test]
fn stored_collection_renders_sublists() {
    let collection = stored_collection(aged_collection());
    let report = render_report(
        &collection.items,
        &config("@blend: {@label[ @finished]~ / }", SortOption::default()),
    );
    assert_eq!(report.text, "Nightcap: 2019 (Finished) / 2021\nHaddo's Delight: ");
    assert!(report.preview.starts_with("Maple Shadows: Lot 1 / Lot 2"));
}

#[test]
fn filtered_collection_drops_finished_tins() {
    let collection = stored_collection(aged_collection());
    let filter = ItemFilter {
        tins: TinFilter {
            hide_finished: true,
            containers: Vec::new(),
            has_tins: true,
        },
        ..ItemFilter::default()
    };
    let items = filter_items(&collection.items, &filter);
    let report = render_items(
        &items,
        &config("@blend: {@label (@T_qty)~ / }", SortOption::default()),
    );
    assert_eq!(report, "Nightcap: 2021 (50 grams)");
}
