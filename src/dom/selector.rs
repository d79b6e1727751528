//! CSS selector subset used by menu configuration.
//!
//! Supported: selector lists (`a, b`), type and universal selectors, `.class`,
//! `#id`, `[attr]`, `[attr="value"]`, `:not(<compound>)`, and the descendant
//! and child (`>`) combinators.

use std::fmt;

use smallvec::SmallVec;

use super::{Document, NodeId};
use crate::error::{MenuError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
    Not(Box<Compound>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    simple: SmallVec<[Simple; 2]>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.simple.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if tag != "*" && element.tag() != tag {
                return false;
            }
        }
        self.simple.iter().all(|simple| match simple {
            Simple::Id(id) => element.attr("id") == Some(id.as_str()),
            Simple::Class(class) => element.has_class(class),
            Simple::Attr { name, value: None } => element.attr(name).is_some(),
            Simple::Attr {
                name,
                value: Some(value),
            } => element.attr(name) == Some(value.as_str()),
            Simple::Not(inner) => !inner.matches(doc, node),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    // Left to right; `combinators[i]` joins `parts[i]` and `parts[i + 1]`.
    parts: SmallVec<[Compound; 2]>,
    combinators: SmallVec<[Combinator; 2]>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, node, self.parts.len() - 1)
    }

    fn matches_at(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if !self.parts[idx].matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(doc, parent, idx - 1)),
            Combinator::Descendant => doc
                .ancestors(node)
                .filter(|&a| doc.is_element(a))
                .any(|a| self.matches_at(doc, a, idx - 1)),
        }
    }
}

/// Parsed selector list.
#[derive(Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: SmallVec<[Complex; 1]>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl Selector {
    /// Parses a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let error = |reason: &str| MenuError::InvalidSelector {
            selector: source.to_owned(),
            reason: reason.to_owned(),
        };
        let mut alternatives = SmallVec::new();
        for part in split_top_level(source) {
            let part = part.trim();
            if part.is_empty() {
                return Err(error("empty selector"));
            }
            alternatives.push(parse_complex(part).map_err(error)?);
        }
        if alternatives.is_empty() {
            return Err(error("empty selector"));
        }
        Ok(Self {
            source: source.to_owned(),
            alternatives,
        })
    }

    /// Selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if `node` is an element matching any alternative.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_element(node) && self.alternatives.iter().any(|c| c.matches(doc, node))
    }
}

fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn is_ident(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '_')
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl Parser<'_> {
    fn ident(&mut self) -> Result<String, &'static str> {
        let mut out = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !is_ident(ch) {
                break;
            }
            out.push(ch);
            self.chars.next();
        }
        if out.is_empty() {
            Err("expected identifier")
        } else {
            Ok(out)
        }
    }

    fn skip_ws(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn compound(&mut self) -> Result<Compound, &'static str> {
        let mut compound = Compound::default();
        loop {
            match self.chars.peek().copied() {
                Some('*') if compound.is_empty() => {
                    self.chars.next();
                    compound.tag = Some("*".to_owned());
                }
                Some(ch) if is_ident(ch) && compound.is_empty() => {
                    compound.tag = Some(self.ident()?.to_ascii_lowercase());
                }
                Some('.') => {
                    self.chars.next();
                    compound.simple.push(Simple::Class(self.ident()?));
                }
                Some('#') => {
                    self.chars.next();
                    compound.simple.push(Simple::Id(self.ident()?));
                }
                Some('[') => {
                    self.chars.next();
                    compound.simple.push(self.attribute()?);
                }
                Some(':') => {
                    self.chars.next();
                    if self.ident()? != "not" || self.chars.next() != Some('(') {
                        return Err("unsupported pseudo-class");
                    }
                    self.skip_ws();
                    let inner = self.compound()?;
                    self.skip_ws();
                    if inner.is_empty() || self.chars.next() != Some(')') {
                        return Err("malformed :not()");
                    }
                    compound.simple.push(Simple::Not(Box::new(inner)));
                }
                _ => break,
            }
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Simple, &'static str> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let value = match self.chars.next() {
            Some(']') => return Ok(Simple::Attr { name, value: None }),
            Some('=') => {
                self.skip_ws();
                let value = match self.chars.peek().copied() {
                    Some(q @ ('"' | '\'')) => {
                        self.chars.next();
                        let mut value = String::new();
                        loop {
                            match self.chars.next() {
                                Some(ch) if ch == q => break,
                                Some(ch) => value.push(ch),
                                None => return Err("unterminated string"),
                            }
                        }
                        value
                    }
                    _ => self.ident()?,
                };
                self.skip_ws();
                value
            }
            _ => return Err("unsupported attribute operator"),
        };
        if self.chars.next() != Some(']') {
            return Err("expected `]`");
        }
        Ok(Simple::Attr {
            name,
            value: Some(value),
        })
    }
}

fn parse_complex(source: &str) -> Result<Complex, &'static str> {
    let mut parser = Parser {
        chars: source.chars().peekable(),
    };
    let mut parts = SmallVec::new();
    let mut combinators = SmallVec::new();
    parser.skip_ws();
    loop {
        let compound = parser.compound()?;
        if compound.is_empty() {
            return Err("expected compound selector");
        }
        parts.push(compound);

        let spaced = parser.skip_ws();
        match parser.chars.peek().copied() {
            None => break,
            Some('>') => {
                parser.chars.next();
                parser.skip_ws();
                combinators.push(Combinator::Child);
            }
            Some(_) if spaced => combinators.push(Combinator::Descendant),
            Some(_) => return Err("unexpected character"),
        }
    }
    Ok(Complex { parts, combinators })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r##"<nav><ul id="m"><li class="menu-item-has-children current-menu-item"><a href="#">P</a><ul><li class="leaf"><a href="/x" hidden>C</a><button disabled>b</button></li></ul></li></ul></nav>"##,
        )
        .unwrap()
    }

    fn tags(doc: &Document, selector: &str) -> Vec<String> {
        let sel = Selector::parse(selector).unwrap();
        doc.query_all(doc.document_node(), &sel)
            .into_iter()
            .map(|n| format!("{}:{}", doc.tag(n).unwrap(), doc.text_content(n)))
            .collect()
    }

    #[test]
    fn child_combinator_only_matches_direct_children() {
        let doc = doc();
        assert_eq!(tags(&doc, ".menu-item-has-children > a"), vec!["a:P"]);
        assert_eq!(tags(&doc, ".menu-item-has-children a"), vec!["a:P", "a:C"]);
    }

    #[test]
    fn attribute_and_negation() {
        let doc = doc();
        assert_eq!(tags(&doc, "a[href]:not([hidden])"), vec!["a:P"]);
        assert_eq!(tags(&doc, "button:not([disabled])"), Vec::<String>::new());
        assert_eq!(tags(&doc, r#"a[href="/x"]"#), vec!["a:C"]);
    }

    #[test]
    fn selector_lists_keep_document_order() {
        let doc = doc();
        assert_eq!(tags(&doc, "button, #m > li > a"), vec!["a:P", "button:b"]);
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for bad in ["", "a,", "li:hover", "a[href^=x]", "a ~ b", "[x"] {
            assert!(
                matches!(Selector::parse(bad), Err(MenuError::InvalidSelector { .. })),
                "{bad}"
            );
        }
    }
}
