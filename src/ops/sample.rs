use chrono::NaiveDate;

use crate::model::item::{Item, Tin, TinUnit};

/// The fixed three-item collection behind every report preview
pub fn sample_items() -> Vec<Item> {
    let mut first = Item::new(1, "Sutliff", "Maple Shadows");
    first.kind = "Aromatic".into();
    first.subgenre = "Black Cavendish".into();
    first.cut = "Ribbon".into();
    first.quantity = 2;
    first.components = vec!["Black Cavendish".into(), "Virginia".into()];
    first.flavorings = vec!["Maple".into()];
    first.push_tin(sample_tin(1, "Lot 1", "Tin", 1.5, TinUnit::Oz, Some((2023, 4, 2)), None));
    first.push_tin(sample_tin(2, "Lot 2", "Jar", 50.0, TinUnit::Grams, None, Some((2024, 1, 15))));

    let mut second = Item::new(2, "Cornell & Diehl", "Pirate Kake");
    second.kind = "English".into();
    second.subgenre = "Balkan".into();
    second.cut = "Cake".into();
    second.quantity = 1;
    second.components = vec!["Latakia".into(), "Virginia".into(), "Perique".into()];
    second.push_tin(sample_tin(3, "Bulk", "Bag", 1.0, TinUnit::Lbs, Some((2022, 9, 30)), None));

    let mut third = Item::new(3, "Peterson", "Irish Flake");
    third.kind = "Virginia/Perique".into();
    third.cut = "Flake".into();
    third.in_production = false;

    vec![first, second, third]
}

fn sample_tin(
    id: u32,
    label: &str,
    container: &str,
    quantity: f64,
    unit: TinUnit,
    cellared: Option<(i32, u32, u32)>,
    opened: Option<(i32, u32, u32)>,
) -> Tin {
    let date = |d: Option<(i32, u32, u32)>| d.and_then(|(y, m, day)| NaiveDate::from_ymd_opt(y, m, day));
    let mut tin = Tin::new(id, 0, label);
    tin.container = container.to_string();
    tin.quantity = quantity;
    tin.unit = unit;
    tin.cellar_date = date(cellared);
    tin.open_date = date(opened);
    tin
}
