//! Lenient HTML fragment parser.
//!
//! Handles the subset of HTML found in navigation markup: nested elements,
//! quoted/unquoted/boolean attributes, void elements, comments, doctype and
//! character references. Unmatched end tags are dropped and `<li>`/`<p>` close
//! an open sibling of the same kind, like a browser would.

use smallvec::SmallVec;

use super::{Document, NodeId};
use crate::error::{MenuError, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&mut pred) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn error(&self, reason: &'static str) -> MenuError {
        MenuError::Markup {
            offset: self.pos,
            reason,
        }
    }
}

pub(super) fn parse_into(doc: &mut Document, parent: NodeId, html: &str) -> Result<Vec<NodeId>> {
    let mut cur = Cursor { src: html, pos: 0 };
    let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
    stack.push(parent);
    let mut top_level = Vec::new();

    let mut append = |doc: &mut Document, stack: &[NodeId], node: NodeId| {
        let owner = stack.last().copied().unwrap_or(parent);
        doc.append_child(owner, node);
        if owner == parent {
            top_level.push(node);
        }
    };

    while !cur.eof() {
        let rest = cur.rest();
        if rest.starts_with("<!--") {
            let end = rest.find("-->").ok_or_else(|| cur.error("unterminated comment"))?;
            cur.pos += end + 3;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').ok_or_else(|| cur.error("unterminated declaration"))?;
            cur.pos += end + 1;
        } else if rest.starts_with("</") {
            cur.pos += 2;
            let name = cur
                .take_while(|b| b.is_ascii_alphanumeric() || b == b'-')
                .to_ascii_lowercase();
            let end = cur
                .rest()
                .find('>')
                .ok_or_else(|| cur.error("unterminated end tag"))?;
            cur.pos += end + 1;
            if let Some(depth) = stack
                .iter()
                .skip(1)
                .rposition(|&n| doc.tag(n) == Some(name.as_str()))
            {
                stack.truncate(depth + 1);
            }
        } else if rest.starts_with('<') && rest.as_bytes().get(1).is_some_and(u8::is_ascii_alphabetic)
        {
            cur.pos += 1;
            let tag = cur
                .take_while(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b':')
                .to_ascii_lowercase();
            let element = doc.create_element(&tag);
            let self_closing = parse_attributes(&mut cur, doc, element)?;

            if matches!(tag.as_str(), "li" | "p")
                && stack.len() > 1
                && stack.last().and_then(|&n| doc.tag(n)) == Some(tag.as_str())
            {
                stack.pop();
            }
            append(doc, &stack, element);

            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) && !self_closing {
                let close = format!("</{tag}");
                let end = cur.rest().find(&close).unwrap_or(cur.rest().len());
                let text = &cur.rest()[..end];
                if !text.is_empty() {
                    let node = doc.create_text(decode_entities(text));
                    doc.append_child(element, node);
                }
                cur.pos += end;
                if let Some(gt) = cur.rest().find('>') {
                    cur.pos += gt + 1;
                }
            } else if !self_closing && !is_void(&tag) {
                stack.push(element);
            }
        } else {
            let end = rest
                .char_indices()
                .skip(1)
                .find(|&(_, ch)| ch == '<')
                .map_or(rest.len(), |(i, _)| i);
            let node = doc.create_text(decode_entities(&rest[..end]));
            append(doc, &stack, node);
            cur.pos += end;
        }
    }

    Ok(top_level)
}

/// Parses attributes up to and including `>`; returns `true` for `/>`.
fn parse_attributes(cur: &mut Cursor<'_>, doc: &mut Document, element: NodeId) -> Result<bool> {
    loop {
        cur.skip_ws();
        match cur.peek() {
            None => return Err(cur.error("unterminated start tag")),
            Some(b'>') => {
                cur.pos += 1;
                return Ok(false);
            }
            Some(b'/') => {
                cur.pos += 1;
                cur.skip_ws();
                if cur.peek() == Some(b'>') {
                    cur.pos += 1;
                    return Ok(true);
                }
            }
            Some(_) => {
                let name = cur
                    .take_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
                    .to_ascii_lowercase();
                if name.is_empty() {
                    cur.pos += 1;
                    continue;
                }
                cur.skip_ws();
                let mut value = String::new();
                if cur.peek() == Some(b'=') {
                    cur.pos += 1;
                    cur.skip_ws();
                    value = match cur.peek() {
                        Some(quote @ (b'"' | b'\'')) => {
                            cur.pos += 1;
                            let raw = cur.take_while(|b| b != quote);
                            if cur.eof() {
                                return Err(cur.error("unterminated attribute value"));
                            }
                            cur.pos += 1;
                            decode_entities(raw)
                        }
                        _ => decode_entities(
                            cur.take_while(|b| !b.is_ascii_whitespace() && b != b'>'),
                        ),
                    };
                }
                doc.set_attr(element, &name, value);
            }
        }
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name.strip_prefix('#').and_then(|num| {
                    let code = num.strip_prefix(['x', 'X']).map_or_else(
                        || num.parse::<u32>().ok(),
                        |hex| u32::from_str_radix(hex, 16).ok(),
                    )?;
                    char::from_u32(code)
                }),
            }?;
            Some((ch, semi + 1))
        });
        if let Some((ch, consumed)) = decoded {
            out.push(ch);
            rest = &rest[consumed..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_lists_with_attributes() {
        let doc = Document::parse(
            r#"<ul class="menu"><li class='x' data-n=3><a href="/a">A</a></li><li>B</li></ul>"#,
        )
        .unwrap();
        let ul = doc.children(doc.document_node())[0];
        assert_eq!(doc.tag(ul), Some("ul"));
        assert_eq!(doc.attr(ul, "class"), Some("menu"));
        let items: Vec<_> = doc.element_children(ul).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(doc.attr(items[0], "data-n"), Some("3"));
        assert_eq!(doc.text_content(items[1]), "B");
    }

    #[test]
    fn implicit_list_item_close() {
        let doc = Document::parse("<ul><li>One<li>Two</ul>").unwrap();
        let ul = doc.children(doc.document_node())[0];
        assert_eq!(doc.element_children(ul).count(), 2);
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() {
        let doc = Document::parse(r#"<div><input disabled><br/><span>x</span></div>"#).unwrap();
        let div = doc.children(doc.document_node())[0];
        let tags: Vec<_> = doc.element_children(div).filter_map(|n| doc.tag(n)).collect();
        assert_eq!(tags, vec!["input", "br", "span"]);
        let input = doc.element_children(div).next().unwrap();
        assert!(doc.has_attr(input, "disabled"));
    }

    #[test]
    fn skips_comments_and_stray_end_tags() {
        let doc = Document::parse("<!doctype html><!-- c --><p>a</b>b</p>").unwrap();
        let p = doc.children(doc.document_node())[0];
        assert_eq!(doc.text_content(p), "ab");
    }

    #[test]
    fn decodes_character_references() {
        assert_eq!(decode_entities("a &lt;b&gt; &#65;&#x42; &bogus; &"), "a <b> AB &bogus; &");
    }

    #[test]
    fn reports_unterminated_tag() {
        let err = Document::parse(r#"<a href="/x"#).unwrap_err();
        assert!(matches!(err, MenuError::Markup { .. }));
    }
}
