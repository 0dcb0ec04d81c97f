use crate::model::config::ReportConfig;
use crate::model::item::{Item, Tin};
use crate::model::report::RenderedReport;
use crate::model::sort::{SortKey, SortOption};
use crate::ops::quantity::Quantities;
use crate::ops::resolve::{is_meaningful, resolve};
use crate::ops::sample::sample_items;
use crate::ops::sort::{Ordered, order};
use crate::parse::template::{NEWLINE_MARKER, Node, Template, parse_template};

/// One record of the report: an item, an (item, tin) pair, or a tin whose
/// owner is out of scope
#[derive(Debug, Clone, Copy)]
struct Record<'a> {
    item: Option<&'a Item>,
    tin: Option<&'a Tin>,
}

/// Everything a node needs while rendering one record
struct Scope<'a, 'r> {
    item: Option<&'a Item>,
    tin: Option<&'a Tin>,
    /// In-scope tins of `item`, for sublists
    item_tins: &'r [&'a Tin],
    /// 1-based record number
    number: usize,
    quantities: &'r Quantities,
    /// The template has a sublist block somewhere
    sublist_line: bool,
    /// Rendering a sublist body for one tin
    in_sublist: bool,
}

/// Render a format template over ordered items and tins.
///
/// Each record expands the template once and is followed by `delimiter`
/// (`_n_` means a line break). The final trailing delimiter is trimmed. A
/// blank template renders an empty report.
pub fn render(
    format: &str,
    delimiter: &str,
    ordered: &Ordered,
    sort: &SortOption,
    quantities: &Quantities,
) -> String {
    if format.trim().is_empty() {
        return String::new();
    }

    let template = parse_template(format);
    let records = records(&template, ordered, sort);
    let delimiter = delimiter.replace(NEWLINE_MARKER, "\n");
    let sublist_line = template.has_sublist();

    tracing::debug!(
        records = records.len(),
        direct_tin = template.has_direct_tin_call(),
        sublist = sublist_line,
        tin_primary = sort.is_tin_primary(),
        "rendering report"
    );

    let mut out = String::new();
    for (n, record) in records.iter().enumerate() {
        let item_tins = record.item.map_or(&[][..], |i| ordered.tins_of(i.id));
        let scope = Scope {
            item: record.item,
            tin: record.tin,
            item_tins,
            number: n + 1,
            quantities,
            sublist_line,
            in_sublist: false,
        };
        render_nodes(&template.nodes, &scope, &mut out);
        out.push_str(&delimiter);
    }

    if !delimiter.is_empty() && out.ends_with(&delimiter) {
        out.truncate(out.len() - delimiter.len());
    }
    out
}

/// Decide what each rendered line is about.
///
/// A template that names a tin field outside any sublist renders one line
/// per (item, tin) pair: in tin order for tin-level sorts, grouped under
/// each item otherwise. Items with no in-scope tins still get one line.
/// Every other template renders one line per item.
fn records<'a>(template: &Template, ordered: &Ordered<'a>, sort: &SortOption) -> Vec<Record<'a>> {
    if !template.has_direct_tin_call() {
        return ordered
            .items
            .iter()
            .map(|&item| Record {
                item: Some(item),
                tin: None,
            })
            .collect();
    }

    if sort.is_tin_primary() {
        return ordered
            .tins
            .iter()
            .map(|&tin| Record {
                item: ordered.owner(tin),
                tin: Some(tin),
            })
            .collect();
    }

    let mut records = Vec::new();
    for &item in &ordered.items {
        let tins = ordered.tins_of(item.id);
        if tins.is_empty() {
            records.push(Record {
                item: Some(item),
                tin: None,
            });
        }
        for &tin in tins {
            records.push(Record {
                item: Some(item),
                tin: Some(tin),
            });
        }
    }
    records
}

fn render_nodes(nodes: &[Node], scope: &Scope, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Placeholder(token) => {
                out.push_str(&resolve(*token, scope.item, scope.tin, scope.quantities))
            }
            Node::Newline => out.push('\n'),
            Node::Counter { width } => {
                out.push_str(&format!("{:0width$}", scope.number, width = *width))
            }
            Node::Conditional(children) => {
                if keep_block(children, scope) {
                    render_nodes(children, scope, out);
                }
            }
            Node::Sublist { body, delimiter } => render_sublist(body, delimiter, scope, out),
        }
    }
}

/// Whether a `[...]` block renders.
///
/// On a line with a sublist the block renders exactly when the item has tins.
/// Otherwise it renders when one of its own placeholders (not those of
/// nested blocks or sublists) has something to show.
fn keep_block(children: &[Node], scope: &Scope) -> bool {
    if scope.sublist_line && !scope.in_sublist {
        return scope.item.is_some() && !scope.item_tins.is_empty();
    }
    children.iter().any(|child| match child {
        Node::Placeholder(token) => {
            let value = resolve(*token, scope.item, scope.tin, scope.quantities);
            is_meaningful(*token, &value)
        }
        _ => false,
    })
}

/// Repeat `body` once per in-scope tin of the current item, joined by
/// `delimiter` with nothing after the last entry
fn render_sublist(body: &[Node], delimiter: &[Node], scope: &Scope, out: &mut String) {
    if scope.item.is_none() {
        return;
    }
    for (n, &tin) in scope.item_tins.iter().enumerate() {
        if n > 0 {
            let between = Scope {
                tin: None,
                in_sublist: true,
                ..*scope
            };
            render_nodes(delimiter, &between, out);
        }
        let entry = Scope {
            tin: Some(tin),
            in_sublist: true,
            ..*scope
        };
        render_nodes(body, &entry, out);
    }
}

/// Sort keys the caller may offer for a template. Tin-level keys only make
/// sense when the template names a tin field outside a sublist.
pub fn available_sort_keys(format: &str) -> Vec<SortKey> {
    let direct_tin = parse_template(format).has_direct_tin_call();
    SortKey::ALL
        .into_iter()
        .filter(|k| direct_tin || !k.is_tin_level())
        .collect()
}

/// Order and render a list of items under one configuration
pub fn render_items(items: &[Item], config: &ReportConfig) -> String {
    let quantities = Quantities::compute(items, config.quantity);
    let ordered = order(items, &config.sort, &quantities);
    render(
        &config.format,
        &config.delimiter,
        &ordered,
        &config.sort,
        &quantities,
    )
}

/// Render the report and its preview over the fixed sample collection
pub fn render_report(items: &[Item], config: &ReportConfig) -> RenderedReport {
    RenderedReport {
        text: render_items(items, config),
        preview: render_items(&sample_items(), config),
    }
}
