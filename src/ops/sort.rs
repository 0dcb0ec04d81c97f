use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::item::{Item, Tin};
use crate::model::sort::{SortKey, SortOption, SubSort};
use crate::ops::quantity::Quantities;

/// Items and tins in report order
#[derive(Debug, Clone, Default)]
pub struct Ordered<'a> {
    pub items: Vec<&'a Item>,
    pub tins: Vec<&'a Tin>,
    owners: HashMap<u32, &'a Item>,
    by_item: IndexMap<u32, Vec<&'a Tin>>,
}

impl<'a> Ordered<'a> {
    fn new(items: Vec<&'a Item>, tins: Vec<&'a Tin>) -> Self {
        let owners = items.iter().map(|i| (i.id, *i)).collect();
        let mut by_item: IndexMap<u32, Vec<&'a Tin>> = IndexMap::new();
        for tin in &tins {
            by_item.entry(tin.item_id).or_default().push(*tin);
        }
        Ordered {
            items,
            tins,
            owners,
            by_item,
        }
    }

    /// The item owning `tin`, if it is in scope
    pub fn owner(&self, tin: &Tin) -> Option<&'a Item> {
        self.owners.get(&tin.item_id).copied()
    }

    /// In-scope tins of one item, in report order
    pub fn tins_of(&self, item_id: u32) -> &[&'a Tin] {
        self.by_item.get(&item_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Order items and their tins for a report.
///
/// Item-level keys sort the items and group the tins under their owners.
/// Tin-level keys sort every tin by the key and then by `sort.sub_sort`.
/// Ties always keep ascending identity order, and a descending sort is the
/// exact reverse of the ascending one.
pub fn order<'a>(items: &'a [Item], sort: &SortOption, quantities: &Quantities) -> Ordered<'a> {
    let mut by_id: Vec<&'a Item> = items.iter().collect();
    by_id.sort_by_key(|i| i.id);

    if sort.key.is_tin_level() {
        let tins = order_tins(&by_id, sort);
        tracing::debug!(key = sort.key.name(), tins = tins.len(), "ordered by tin");
        Ordered::new(by_id, tins)
    } else {
        let ordered = order_items(by_id, sort, quantities);
        let position: HashMap<u32, usize> =
            ordered.iter().enumerate().map(|(n, i)| (i.id, n)).collect();
        let mut tins: Vec<&'a Tin> = ordered.iter().flat_map(|i| i.tins.iter()).collect();
        tins.sort_by_key(|t| (position.get(&t.item_id).copied(), t.id));
        tracing::debug!(key = sort.key.name(), items = ordered.len(), "ordered by item");
        Ordered::new(ordered, tins)
    }
}

fn text_key(s: &str) -> String {
    s.to_lowercase()
}

fn order_items<'a>(
    mut items: Vec<&'a Item>,
    sort: &SortOption,
    quantities: &Quantities,
) -> Vec<&'a Item> {
    // Input is already in identity order, so a stable sort keeps identity
    // as the tiebreak.
    match sort.key {
        SortKey::Brand => items.sort_by(|a, b| text_key(&a.brand).cmp(&text_key(&b.brand))),
        SortKey::Blend => items.sort_by(|a, b| text_key(&a.blend).cmp(&text_key(&b.blend))),
        SortKey::Type => items.sort_by(|a, b| text_key(&a.kind).cmp(&text_key(&b.kind))),
        SortKey::Subgenre => {
            items.sort_by(|a, b| text_key(&a.subgenre).cmp(&text_key(&b.subgenre)))
        }
        SortKey::Cut => items.sort_by(|a, b| text_key(&a.cut).cmp(&text_key(&b.cut))),
        SortKey::Quantity => {
            items.sort_by(|a, b| quantities.value(a.id).total_cmp(&quantities.value(b.id)))
        }
        // Item Default, and anything unexpected, is identity order
        _ => {}
    }
    if !sort.ascending {
        items.reverse();
    }
    items
}

fn order_tins<'a>(items: &[&'a Item], sort: &SortOption) -> Vec<&'a Tin> {
    let owners: HashMap<u32, &Item> = items.iter().map(|i| (i.id, *i)).collect();
    let mut tins: Vec<&'a Tin> = items.iter().flat_map(|i| i.tins.iter()).collect();
    tins.sort_by_key(|t| t.id);

    tins.sort_by(|a, b| {
        primary(sort.key, a, b).then_with(|| sub_sort(sort.sub_sort, &owners, a, b))
    });
    if !sort.ascending {
        tins.reverse();
    }
    tins
}

fn primary(key: SortKey, a: &Tin, b: &Tin) -> Ordering {
    match key {
        SortKey::TinLabel => text_key(&a.label).cmp(&text_key(&b.label)),
        SortKey::TinContainer => {
            // Blank containers sort after every named one
            let blank_a = a.container.trim().is_empty();
            let blank_b = b.container.trim().is_empty();
            blank_a
                .cmp(&blank_b)
                .then_with(|| text_key(&a.container).cmp(&text_key(&b.container)))
        }
        SortKey::TinQuantity => a.normalized_grams().total_cmp(&b.normalized_grams()),
        _ => a.id.cmp(&b.id),
    }
}

fn sub_sort(sub: SubSort, owners: &HashMap<u32, &Item>, a: &Tin, b: &Tin) -> Ordering {
    let field = |tin: &Tin, f: fn(&Item) -> &str| {
        owners
            .get(&tin.item_id)
            .map(|i| text_key(f(i)))
            .unwrap_or_default()
    };
    match sub {
        SubSort::ItemDefault => a.item_id.cmp(&b.item_id),
        SubSort::TinDefault => a.id.cmp(&b.id),
        SubSort::Brand => field(a, |i| &i.brand).cmp(&field(b, |i| &i.brand)),
        SubSort::Blend => field(a, |i| &i.blend).cmp(&field(b, |i| &i.blend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::QuantityDisplay;
    use crate::model::item::TinUnit;
    use pretty_assertions::assert_eq;

    fn item(id: u32, brand: &str, blend: &str) -> Item {
        Item::new(id, brand, blend)
    }

    fn tin(id: u32, label: &str, quantity: f64, unit: TinUnit) -> Tin {
        let mut t = Tin::new(id, 0, label);
        t.quantity = quantity;
        t.unit = unit;
        t
    }

    fn item_ids(ordered: &Ordered) -> Vec<u32> {
        ordered.items.iter().map(|i| i.id).collect()
    }

    fn tin_ids(ordered: &Ordered) -> Vec<u32> {
        ordered.tins.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_item_default_is_identity_order() {
        let items = vec![item(3, "C", "x"), item(1, "A", "y"), item(2, "B", "z")];
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::default(), &q);
        assert_eq!(item_ids(&ordered), vec![1, 2, 3]);
    }

    #[test]
    fn test_brand_sort_is_case_insensitive() {
        let items = vec![item(1, "cornell", "x"), item(2, "Acme", "y"), item(3, "Bell", "z")];
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::new(SortKey::Brand), &q);
        assert_eq!(item_ids(&ordered), vec![2, 3, 1]);
    }

    #[test]
    fn test_descending_is_literal_reverse() {
        // Ties on brand: ascending keeps identity order inside each tie,
        // descending reverses it rather than re-sorting.
        let items = vec![
            item(1, "Acme", "a"),
            item(2, "Bell", "b"),
            item(3, "Acme", "c"),
            item(4, "Bell", "d"),
            item(5, "Acme", "e"),
        ];
        let q = Quantities::default();
        let asc = order(&items, &SortOption::new(SortKey::Brand), &q);
        assert_eq!(item_ids(&asc), vec![1, 3, 5, 2, 4]);

        let desc = order(&items, &SortOption::new(SortKey::Brand).with_ascending(false), &q);
        assert_eq!(item_ids(&desc), vec![4, 2, 5, 3, 1]);
    }

    #[test]
    fn test_item_quantity_sort() {
        let mut a = item(1, "A", "a");
        a.quantity = 5;
        let mut b = item(2, "B", "b");
        b.quantity = 9;
        let c = item(3, "C", "c");
        let items = vec![a, b, c];
        let q = Quantities::compute(&items, QuantityDisplay::Count);
        let ordered = order(&items, &SortOption::new(SortKey::Quantity), &q);
        assert_eq!(item_ids(&ordered), vec![2, 1, 3]);
    }

    #[test]
    fn test_item_sort_groups_tins_by_owner() {
        let mut a = item(1, "Zed", "a");
        a.push_tin(tin(11, "a1", 0.0, TinUnit::None));
        a.push_tin(tin(10, "a0", 0.0, TinUnit::None));
        let mut b = item(2, "Acme", "b");
        b.push_tin(tin(20, "b0", 0.0, TinUnit::None));
        let c = item(3, "Mid", "c");
        let items = vec![a, b, c];
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::new(SortKey::Brand), &q);
        assert_eq!(item_ids(&ordered), vec![2, 3, 1]);
        assert_eq!(tin_ids(&ordered), vec![20, 10, 11]);
        assert_eq!(ordered.tins_of(1).len(), 2);
        assert!(ordered.tins_of(3).is_empty());
    }

    #[test]
    fn test_tin_quantity_descending_by_weight() {
        let mut a = item(1, "Acme", "a");
        a.push_tin(tin(1, "one ounce", 1.0, TinUnit::Oz));
        a.push_tin(tin(2, "fifty grams", 50.0, TinUnit::Grams));
        let mut finished = tin(3, "finished", 2.0, TinUnit::Oz);
        finished.finished = true;
        a.push_tin(finished);
        let items = vec![a];
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::new(SortKey::TinQuantity), &q);
        assert_eq!(tin_ids(&ordered), vec![2, 1, 3]);
    }

    #[test]
    fn test_tin_container_blank_last() {
        let mut a = item(1, "Acme", "a");
        let mut t1 = tin(1, "x", 0.0, TinUnit::None);
        t1.container = String::new();
        let mut t2 = tin(2, "y", 0.0, TinUnit::None);
        t2.container = "Tin".into();
        let mut t3 = tin(3, "z", 0.0, TinUnit::None);
        t3.container = "Jar".into();
        a.tins = vec![t1, t2, t3];
        a.link_tins();
        let items = vec![a];
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::new(SortKey::TinContainer), &q);
        assert_eq!(tin_ids(&ordered), vec![3, 2, 1]);
    }

    #[test]
    fn test_tin_label_sub_sort_by_brand() {
        let mut a = item(1, "Zed", "a");
        a.push_tin(tin(1, "Lot", 0.0, TinUnit::None));
        let mut b = item(2, "Acme", "b");
        b.push_tin(tin(2, "Lot", 0.0, TinUnit::None));
        let items = vec![a, b];
        let q = Quantities::default();

        let by_item = order(&items, &SortOption::new(SortKey::TinLabel), &q);
        assert_eq!(tin_ids(&by_item), vec![1, 2]);

        let by_brand = order(
            &items,
            &SortOption::new(SortKey::TinLabel).with_sub_sort(SubSort::Brand),
            &q,
        );
        assert_eq!(tin_ids(&by_brand), vec![2, 1]);

        let reversed = order(
            &items,
            &SortOption::new(SortKey::TinLabel)
                .with_sub_sort(SubSort::Brand)
                .with_ascending(false),
            &q,
        );
        assert_eq!(tin_ids(&reversed), vec![1, 2]);
    }

    #[test]
    fn test_tin_sort_keeps_item_identity_order() {
        let mut b = item(2, "B", "b");
        b.push_tin(tin(1, "z", 0.0, TinUnit::None));
        let a = item(1, "A", "a");
        let items = vec![b, a];
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::new(SortKey::TinLabel), &q);
        assert_eq!(item_ids(&ordered), vec![1, 2]);
        assert_eq!(ordered.owner(ordered.tins[0]).map(|i| i.id), Some(2));
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<Item> = Vec::new();
        let q = Quantities::default();
        let ordered = order(&items, &SortOption::new(SortKey::TinLabel), &q);
        assert!(ordered.items.is_empty());
        assert!(ordered.tins.is_empty());
    }
}
