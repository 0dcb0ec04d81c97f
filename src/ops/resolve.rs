use chrono::NaiveDate;

use crate::model::item::{Item, Tin, TinUnit};
use crate::ops::quantity::{Quantities, format_amount};
use crate::parse::token::{Token, TokenContext};

/// `strftime` pattern for medium-length dates (`Mar 5, 2024`)
pub const MEDIUM_DATE: &str = "%b %-d, %Y";

/// Text for one placeholder given the item and tin in context.
///
/// Item placeholders with no item in context, and tin placeholders with no
/// tin in context, resolve to the empty string. Every call is independent of
/// every other.
pub fn resolve(
    token: Token,
    item: Option<&Item>,
    tin: Option<&Tin>,
    quantities: &Quantities,
) -> String {
    match token.context() {
        TokenContext::Item => item.map_or_else(String::new, |i| resolve_item(token, i, quantities)),
        TokenContext::Tin => tin.map_or_else(String::new, |t| resolve_tin(token, t)),
    }
}

/// Whether a placeholder gives a conditional block a reason to render: it
/// must resolve to something non-blank that is not just its own spelling.
pub fn is_meaningful(token: Token, value: &str) -> bool {
    !value.trim().is_empty() && value != token.spelling()
}

fn resolve_item(token: Token, item: &Item, quantities: &Quantities) -> String {
    match token {
        Token::Brand => item.brand.clone(),
        Token::Blend => item.blend.clone(),
        Token::Type => item.kind.clone(),
        Token::Subgenre => item.subgenre.clone(),
        Token::Cut => item.cut.clone(),
        Token::Components => item.components.join(", "),
        Token::Flavorings => item.flavorings.join(", "),
        Token::Quantity => quantities.display(item.id).to_string(),
        Token::Production => item.production_status().to_string(),
        _ => String::new(),
    }
}

fn resolve_tin(token: Token, tin: &Tin) -> String {
    match token {
        Token::Label => tin.label.clone(),
        Token::Container => tin.container.clone(),
        Token::TinQuantity => tin_quantity(tin),
        Token::Manufacture => medium_date(tin.manufacture_date),
        Token::Cellar => medium_date(tin.cellar_date),
        Token::Open => medium_date(tin.open_date),
        Token::Finished => {
            if tin.finished {
                "(Finished)".to_string()
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}

fn tin_quantity(tin: &Tin) -> String {
    if tin.finished || tin.unit == TinUnit::None {
        return String::new();
    }
    format!("{} {}", format_amount(tin.quantity), tin.unit.label())
}

fn medium_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(MEDIUM_DATE).to_string())
        .unwrap_or_default()
}
