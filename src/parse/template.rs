use super::token::Token;

/// Escape marker: `'` followed by a reserved symbol yields that symbol literally
pub const ESCAPE: char = '\'';
/// Symbols with template meaning, escapable with `'`
pub const RESERVED: [char; 7] = ['#', '[', ']', '{', '}', '\'', '~'];
/// Line-break marker, valid in templates and delimiters
pub const NEWLINE_MARKER: &str = "_n_";

/// One node of a parsed format template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text (escapes already resolved)
    Text(String),
    Placeholder(Token),
    /// `_n_`
    Newline,
    /// A run of `#`, replaced by the zero-padded record number
    Counter { width: usize },
    /// `[...]`, kept or dropped depending on its placeholders
    Conditional(Vec<Node>),
    /// `{body~delimiter}`, repeated once per tin of the current item
    Sublist { body: Vec<Node>, delimiter: Vec<Node> },
}

/// A parsed format template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub nodes: Vec<Node>,
}

impl Template {
    /// Whether a tin placeholder appears outside every sublist block.
    ///
    /// When true, the report emits one record per (item, tin) pair.
    pub fn has_direct_tin_call(&self) -> bool {
        fn walk(nodes: &[Node]) -> bool {
            nodes.iter().any(|n| match n {
                Node::Placeholder(t) => t.is_tin(),
                Node::Conditional(children) => walk(children),
                _ => false,
            })
        }
        walk(&self.nodes)
    }

    /// Whether the template contains a `{...}` sublist block anywhere
    pub fn has_sublist(&self) -> bool {
        fn walk(nodes: &[Node]) -> bool {
            nodes.iter().any(|n| match n {
                Node::Sublist { .. } => true,
                Node::Conditional(children) => walk(children),
                _ => false,
            })
        }
        walk(&self.nodes)
    }
}

/// Parse a format template. Never fails: anything that does not form valid
/// syntax is kept as literal text.
pub fn parse_template(source: &str) -> Template {
    let lexemes = lex(source);
    let pieces = group_sublists(lexemes);
    Template {
        nodes: build_nodes(pieces),
    }
}

// ---------------------------------------------------------------------------
// Lexing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    Text(String),
    Placeholder(Token),
    Newline,
    Hashes(usize),
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Tilde,
}

impl Lexeme {
    /// Literal spelling, used when a structural symbol turns out unmatched
    fn literal(&self) -> Option<&'static str> {
        match self {
            Lexeme::OpenBracket => Some("["),
            Lexeme::CloseBracket => Some("]"),
            Lexeme::OpenBrace => Some("{"),
            Lexeme::CloseBrace => Some("}"),
            Lexeme::Tilde => Some("~"),
            _ => None,
        }
    }
}

fn push_text(out: &mut Vec<Lexeme>, text: &str) {
    if let Some(Lexeme::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Lexeme::Text(text.to_string()));
    }
}

fn lex(source: &str) -> Vec<Lexeme> {
    let mut out = Vec::new();
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        let len = c.len_utf8();
        match c {
            ESCAPE => {
                let next = rest[len..].chars().next();
                match next {
                    Some(sym) if RESERVED.contains(&sym) => {
                        push_text(&mut out, sym.encode_utf8(&mut [0; 4]));
                        rest = &rest[len + sym.len_utf8()..];
                    }
                    _ => {
                        push_text(&mut out, "'");
                        rest = &rest[len..];
                    }
                }
            }
            '@' => match Token::match_prefix(rest) {
                Some(token) => {
                    out.push(Lexeme::Placeholder(token));
                    rest = &rest[token.spelling().len()..];
                }
                None => {
                    push_text(&mut out, "@");
                    rest = &rest[len..];
                }
            },
            '#' => {
                let width = rest.chars().take_while(|&ch| ch == '#').count();
                out.push(Lexeme::Hashes(width));
                rest = &rest[width..];
            }
            '[' => {
                out.push(Lexeme::OpenBracket);
                rest = &rest[len..];
            }
            ']' => {
                out.push(Lexeme::CloseBracket);
                rest = &rest[len..];
            }
            '{' => {
                out.push(Lexeme::OpenBrace);
                rest = &rest[len..];
            }
            '}' => {
                out.push(Lexeme::CloseBrace);
                rest = &rest[len..];
            }
            '~' => {
                out.push(Lexeme::Tilde);
                rest = &rest[len..];
            }
            _ if rest.starts_with(NEWLINE_MARKER) => {
                out.push(Lexeme::Newline);
                rest = &rest[NEWLINE_MARKER.len()..];
            }
            _ => {
                push_text(&mut out, &rest[..len]);
                rest = &rest[len..];
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Piece {
    Lex(Lexeme),
    Sublist {
        body: Vec<Lexeme>,
        delimiter: Vec<Lexeme>,
    },
}

/// Recognize `{...}` blocks first. A `{` opens a block only when the next
/// brace after it is a `}`; every other brace is literal.
fn group_sublists(lexemes: Vec<Lexeme>) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(lexemes.len());
    let mut pending: Option<Vec<Lexeme>> = None;

    for lexeme in lexemes {
        match lexeme {
            Lexeme::OpenBrace => {
                // A second `{` before any `}`: the earlier one was literal.
                if let Some(inner) = pending.replace(Vec::new()) {
                    pieces.push(Piece::Lex(Lexeme::OpenBrace));
                    pieces.extend(inner.into_iter().map(Piece::Lex));
                }
            }
            Lexeme::CloseBrace => match pending.take() {
                Some(inner) => pieces.push(split_sublist(inner)),
                None => pieces.push(Piece::Lex(Lexeme::CloseBrace)),
            },
            other => match pending.as_mut() {
                Some(inner) => inner.push(other),
                None => pieces.push(Piece::Lex(other)),
            },
        }
    }

    if let Some(inner) = pending {
        pieces.push(Piece::Lex(Lexeme::OpenBrace));
        pieces.extend(inner.into_iter().map(Piece::Lex));
    }

    pieces
}

/// Split a block's contents at its last `~`
fn split_sublist(mut inner: Vec<Lexeme>) -> Piece {
    match inner.iter().rposition(|l| *l == Lexeme::Tilde) {
        Some(pos) => {
            let delimiter = inner.split_off(pos + 1);
            inner.pop();
            Piece::Sublist {
                body: inner,
                delimiter,
            }
        }
        None => Piece::Sublist {
            body: inner,
            delimiter: Vec::new(),
        },
    }
}

fn push_node(out: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node
        && let Some(Node::Text(prev)) = out.last_mut()
    {
        prev.push_str(text);
        return;
    }
    if let Node::Text(text) = &node
        && text.is_empty()
    {
        return;
    }
    out.push(node);
}

fn lexeme_node(lexeme: Lexeme) -> Node {
    if let Some(literal) = lexeme.literal() {
        return Node::Text(literal.to_string());
    }
    match lexeme {
        Lexeme::Text(t) => Node::Text(t),
        Lexeme::Placeholder(t) => Node::Placeholder(t),
        Lexeme::Newline => Node::Newline,
        Lexeme::Hashes(width) => Node::Counter { width },
        // Structural lexemes are handled by `literal` above
        _ => Node::Text(String::new()),
    }
}

/// Match `[`/`]` with a stack. Unmatched brackets become literal text.
fn build_nodes(pieces: Vec<Piece>) -> Vec<Node> {
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];

    for piece in pieces {
        match piece {
            Piece::Lex(Lexeme::OpenBracket) => stack.push(Vec::new()),
            Piece::Lex(Lexeme::CloseBracket) if stack.len() > 1 => {
                let children = stack.pop().unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::Conditional(children));
                }
            }
            Piece::Lex(lexeme) => {
                if let Some(frame) = stack.last_mut() {
                    push_node(frame, lexeme_node(lexeme));
                }
            }
            Piece::Sublist { body, delimiter } => {
                let node = Node::Sublist {
                    body: build_nodes(body.into_iter().map(Piece::Lex).collect()),
                    delimiter: build_nodes(delimiter.into_iter().map(Piece::Lex).collect()),
                };
                if let Some(frame) = stack.last_mut() {
                    frame.push(node);
                }
            }
        }
    }

    // Unwind brackets that were never closed
    while stack.len() > 1 {
        let children = stack.pop().unwrap_or_default();
        if let Some(parent) = stack.last_mut() {
            push_node(parent, Node::Text("[".to_string()));
            for child in children {
                push_node(parent, child);
            }
        }
    }

    stack.pop().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    #[test]
    fn test_plain_text_and_placeholders() {
        let t = parse_template("@brand - @blend");
        assert_eq!(
            t.nodes,
            vec![
                Node::Placeholder(Token::Brand),
                text(" - "),
                Node::Placeholder(Token::Blend),
            ]
        );
    }

    #[test]
    fn test_unknown_at_is_literal() {
        let t = parse_template("mail@home @brandy");
        assert_eq!(
            t.nodes,
            vec![
                text("mail@home "),
                Node::Placeholder(Token::Brand),
                text("y"),
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let t = parse_template("'#@brand 'x ''");
        assert_eq!(
            t.nodes,
            vec![text("#"), Node::Placeholder(Token::Brand), text(" 'x '")]
        );
    }

    #[test]
    fn test_escaped_hash_splits_counter_runs() {
        let t = parse_template("#'##");
        assert_eq!(
            t.nodes,
            vec![
                Node::Counter { width: 1 },
                text("#"),
                Node::Counter { width: 1 },
            ]
        );
    }

    #[test]
    fn test_newline_marker() {
        let t = parse_template("a_n_b");
        assert_eq!(t.nodes, vec![text("a"), Node::Newline, text("b")]);
    }

    #[test]
    fn test_nested_conditionals() {
        let t = parse_template("[a [@cut] b]");
        assert_eq!(
            t.nodes,
            vec![Node::Conditional(vec![
                text("a "),
                Node::Conditional(vec![Node::Placeholder(Token::Cut)]),
                text(" b"),
            ])]
        );
    }

    #[test]
    fn test_unbalanced_brackets_are_literal() {
        let t = parse_template("[a[@cut]");
        assert_eq!(
            t.nodes,
            vec![
                text("[a"),
                Node::Conditional(vec![Node::Placeholder(Token::Cut)]),
            ]
        );

        let t = parse_template("x]y");
        assert_eq!(t.nodes, vec![text("x]y")]);
    }

    #[test]
    fn test_sublist_with_delimiter() {
        let t = parse_template("{@label~, }");
        assert_eq!(
            t.nodes,
            vec![Node::Sublist {
                body: vec![Node::Placeholder(Token::Label)],
                delimiter: vec![text(", ")],
            }]
        );
        assert!(t.has_sublist());
        assert!(!t.has_direct_tin_call());
    }

    #[test]
    fn test_sublist_splits_at_last_tilde() {
        let t = parse_template("{a~b~c}");
        assert_eq!(
            t.nodes,
            vec![Node::Sublist {
                body: vec![text("a~b")],
                delimiter: vec![text("c")],
            }]
        );
    }

    #[test]
    fn test_sublist_without_tilde() {
        let t = parse_template("{@label}");
        assert_eq!(
            t.nodes,
            vec![Node::Sublist {
                body: vec![Node::Placeholder(Token::Label)],
                delimiter: vec![],
            }]
        );
    }

    #[test]
    fn test_nested_braces_keep_innermost() {
        let t = parse_template("{a{@label}b}");
        assert_eq!(
            t.nodes,
            vec![
                text("{a"),
                Node::Sublist {
                    body: vec![Node::Placeholder(Token::Label)],
                    delimiter: vec![],
                },
                text("b}"),
            ]
        );
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let t = parse_template("{@label");
        assert_eq!(t.nodes, vec![text("{"), Node::Placeholder(Token::Label)]);
        assert!(t.has_direct_tin_call());
    }

    #[test]
    fn test_brace_masks_brackets() {
        // The sublist claims the `]`, so the `[` has no partner.
        let t = parse_template("[a{b]c}");
        assert_eq!(
            t.nodes,
            vec![
                text("[a"),
                Node::Sublist {
                    body: vec![text("b]c")],
                    delimiter: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_conditional_inside_sublist() {
        let t = parse_template("{@label[ (@T_qty)]~; }");
        assert_eq!(
            t.nodes,
            vec![Node::Sublist {
                body: vec![
                    Node::Placeholder(Token::Label),
                    Node::Conditional(vec![
                        text(" ("),
                        Node::Placeholder(Token::TinQuantity),
                        text(")"),
                    ]),
                ],
                delimiter: vec![text("; ")],
            }]
        );
    }

    #[test]
    fn test_direct_tin_call_inside_conditional() {
        assert!(parse_template("@brand[ - @label]").has_direct_tin_call());
        assert!(!parse_template("@brand{ - @label~}").has_direct_tin_call());
    }

    #[test]
    fn test_escaped_structural_symbols() {
        let t = parse_template("'[@cut'] '{x'} '~");
        assert_eq!(
            t.nodes,
            vec![
                text("["),
                Node::Placeholder(Token::Cut),
                text("] {x} ~"),
            ]
        );
    }
}
