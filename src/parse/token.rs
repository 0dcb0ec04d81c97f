use std::fmt;

use serde::Serialize;

/// Which record a placeholder reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenContext {
    Item,
    Tin,
}

/// Every recognized `@` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Brand,
    Blend,
    Type,
    Subgenre,
    Cut,
    Components,
    Flavorings,
    Quantity,
    Production,
    Label,
    Container,
    TinQuantity,
    Manufacture,
    Cellar,
    Open,
    Finished,
}

impl Token {
    pub const ALL: [Token; 16] = [
        Token::Brand,
        Token::Blend,
        Token::Type,
        Token::Subgenre,
        Token::Cut,
        Token::Components,
        Token::Flavorings,
        Token::Quantity,
        Token::Production,
        Token::Label,
        Token::Container,
        Token::TinQuantity,
        Token::Manufacture,
        Token::Cellar,
        Token::Open,
        Token::Finished,
    ];

    /// The literal text of the token, including the leading `@`
    pub fn spelling(self) -> &'static str {
        match self {
            Token::Brand => "@brand",
            Token::Blend => "@blend",
            Token::Type => "@type",
            Token::Subgenre => "@subgenre",
            Token::Cut => "@cut",
            Token::Components => "@comps",
            Token::Flavorings => "@flavors",
            Token::Quantity => "@qty",
            Token::Production => "@prod",
            Token::Label => "@label",
            Token::Container => "@container",
            Token::TinQuantity => "@T_qty",
            Token::Manufacture => "@manufacture",
            Token::Cellar => "@cellar",
            Token::Open => "@open",
            Token::Finished => "@finished",
        }
    }

    pub fn context(self) -> TokenContext {
        match self {
            Token::Brand
            | Token::Blend
            | Token::Type
            | Token::Subgenre
            | Token::Cut
            | Token::Components
            | Token::Flavorings
            | Token::Quantity
            | Token::Production => TokenContext::Item,
            Token::Label
            | Token::Container
            | Token::TinQuantity
            | Token::Manufacture
            | Token::Cellar
            | Token::Open
            | Token::Finished => TokenContext::Tin,
        }
    }

    pub fn is_tin(self) -> bool {
        self.context() == TokenContext::Tin
    }

    /// One-line help text for `cellar tokens`
    pub fn description(self) -> &'static str {
        match self {
            Token::Brand => "brand name",
            Token::Blend => "blend name",
            Token::Type => "blend type",
            Token::Subgenre => "subgenre",
            Token::Cut => "cut",
            Token::Components => "component names, comma separated",
            Token::Flavorings => "flavoring names, comma separated",
            Token::Quantity => "item quantity in the selected display mode",
            Token::Production => "\"In Production\" or \"Discontinued\"",
            Token::Label => "tin label",
            Token::Container => "container type",
            Token::TinQuantity => "tin amount and unit, blank if finished or unitless",
            Token::Manufacture => "manufacture date",
            Token::Cellar => "cellared date",
            Token::Open => "opened date",
            Token::Finished => "\"(Finished)\" for finished tins",
        }
    }

    /// Longest token spelled at the start of `s`, if any
    pub fn match_prefix(s: &str) -> Option<Token> {
        Token::ALL
            .into_iter()
            .filter(|t| s.starts_with(t.spelling()))
            .max_by_key(|t| t.spelling().len())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_prefix() {
        assert_eq!(Token::match_prefix("@brand and more"), Some(Token::Brand));
        assert_eq!(Token::match_prefix("@T_qty"), Some(Token::TinQuantity));
        assert_eq!(Token::match_prefix("@cellar"), Some(Token::Cellar));
        assert_eq!(Token::match_prefix("@cutting"), Some(Token::Cut));
        assert_eq!(Token::match_prefix("@nothing"), None);
        assert_eq!(Token::match_prefix("brand"), None);
    }

    #[test]
    fn test_spellings_are_unique() {
        for a in Token::ALL {
            for b in Token::ALL {
                if a != b {
                    assert_ne!(a.spelling(), b.spelling());
                }
            }
        }
    }

    #[test]
    fn test_contexts() {
        assert_eq!(Token::Production.context(), TokenContext::Item);
        assert!(Token::TinQuantity.is_tin());
        assert!(!Token::Quantity.is_tin());
    }
}
