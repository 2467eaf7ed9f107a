//! Lenient markup parsing and serialization.
//!
//! The parser accepts the fragment markup injected by behaviors (modal
//! content, "load more" pages, page files for the preview). It never fails:
//! stray closing tags are dropped, unclosed elements are closed at the end of
//! input and a `<` that does not start a tag is kept as text.

use super::{Document, NodeId};

/// Elements that never have children and are serialized without a close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn parse_into(doc: &mut Document, parent: NodeId, input: &str) {
    let mut stack: Vec<NodeId> = vec![parent];
    let mut text = String::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            flush_text(doc, &stack, &mut text);
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }
        if let Some(after) = rest.strip_prefix("</") {
            if let Some((name, consumed)) = read_close_tag(after) {
                flush_text(doc, &stack, &mut text);
                if let Some(pos) = stack
                    .iter()
                    .skip(1)
                    .rposition(|id| doc.tag(*id) == Some(name.as_str()))
                {
                    stack.truncate(pos + 1);
                }
                rest = &after[consumed..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('<')
            && let Some(tag) = read_open_tag(after)
        {
            flush_text(doc, &stack, &mut text);
            let el = doc.create_element(&tag.name);
            for (k, v) in &tag.attrs {
                doc.set_attr(el, k, v);
            }
            let top = stack.last().copied().unwrap_or(parent);
            doc.append_child(top, el);
            if !tag.self_closing && !is_void(&tag.name) {
                stack.push(el);
            }
            rest = &after[tag.consumed..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            text.push(ch);
        }
        rest = chars.as_str();
    }
    flush_text(doc, &stack, &mut text);
}

fn flush_text(doc: &mut Document, stack: &[NodeId], text: &mut String) {
    if text.is_empty() {
        return;
    }
    let Some(parent) = stack.last().copied() else {
        return;
    };
    let node = doc.create_text(&decode_entities(text));
    doc.append_child(parent, node);
    text.clear();
}

fn read_close_tag(input: &str) -> Option<(String, usize)> {
    let end = input.find('>')?;
    let name = input[..end].trim();
    if name.is_empty() || !name.chars().all(is_name_char) {
        return None;
    }
    Some((name.to_ascii_lowercase(), end + 1))
}

struct OpenTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    consumed: usize,
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':'
}

/// Forward-only scanner over a tag's text. Every step costs only the
/// characters it consumes.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_space(&mut self) {
        self.eat_while(char::is_whitespace);
    }
}

fn read_open_tag(input: &str) -> Option<OpenTag> {
    let mut cur = Cursor::new(input);
    if !cur.peek()?.is_ascii_alphabetic() {
        return None;
    }
    let name = cur.eat_while(is_name_char).to_ascii_lowercase();
    let mut attrs = Vec::new();
    loop {
        cur.skip_space();
        let self_closing = cur.rest().starts_with("/>");
        if self_closing || cur.peek()? == '>' {
            cur.pos += if self_closing { 2 } else { 1 };
            return Some(OpenTag {
                name,
                attrs,
                self_closing,
                consumed: cur.pos,
            });
        }
        let key = cur.eat_while(|c| !matches!(c, '=' | '>' | '/') && !c.is_whitespace());
        if key.is_empty() {
            return None;
        }
        cur.skip_space();
        let mut value = "";
        if cur.eat('=') {
            cur.skip_space();
            match cur.peek()? {
                q @ ('"' | '\'') => {
                    cur.eat(q);
                    value = cur.eat_while(|c| c != q);
                    if !cur.eat(q) {
                        return None;
                    }
                }
                _ => value = cur.eat_while(|c| !c.is_whitespace() && c != '>'),
            }
        }
        attrs.push((key.to_ascii_lowercase(), decode_entities(value)));
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

pub(crate) fn serialize_children(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(node) {
        serialize_node(doc, *child, &mut out);
    }
    out
}

pub fn serialize_node(doc: &Document, node: NodeId, out: &mut String) {
    if let Some(text) = doc.text(node) {
        out.push_str(&escape_text(text));
        return;
    }
    let Some(tag) = doc.tag(node) else {
        return;
    };
    out.push('<');
    out.push_str(tag);
    for (k, v) in doc.attrs(node) {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(&escape_attr(v));
        out.push('"');
    }
    out.push('>');
    if is_void(tag) {
        return;
    }
    for child in doc.children(node) {
        serialize_node(doc, *child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
