//! Compound CSS selectors
//!
//! Supports comma-separated lists of compound selectors built from a tag
//! name or `*`, `#id`, `.class`, `[attr]`, `[attr=value]` and
//! `[attr^=value]`. Combinators are not supported; behaviors scope their
//! queries through `Document::query_selector` instead.

use std::fmt;

use thiserror::Error;

use super::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("unterminated attribute selector in `{0}`")]
    UnterminatedAttribute(String),
    #[error("unexpected character `{ch}` in selector `{selector}`")]
    UnexpectedChar { selector: String, ch: char },
    #[error("combinators are not supported: `{0}`")]
    Combinator(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

impl AttrMatch {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self {
            AttrMatch::Exists(name) => doc.has_attr(node, name),
            AttrMatch::Equals(name, value) => doc.attr(node, name) == Some(value.as_str()),
            AttrMatch::Prefix(name, value) => doc
                .attr(node, name)
                .is_some_and(|v| v.starts_with(value.as_str())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| doc.id_attr(node) != Some(id)) {
            return false;
        }
        self.classes.iter().all(|c| doc.has_class(node, c))
            && self.attrs.iter().all(|a| a.matches(doc, node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let alternatives = split_top_level(trimmed)
            .into_iter()
            .map(|part| parse_compound(part.trim(), trimmed))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: trimmed.to_string(),
            alternatives,
        })
    }

    /// Selector matching elements carrying `class`.
    pub fn class(class: &str) -> Result<Self, SelectorError> {
        Self::parse(&format!(".{class}"))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// Commas inside attribute brackets or quotes do not split the list.
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
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

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_compound(part: &str, whole: &str) -> Result<Compound, SelectorError> {
    if part.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut compound = Compound::default();
    let chars: Vec<char> = part.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '*' if i == 0 => i += 1,
            '#' => {
                i += 1;
                let ident = read_ident(&mut i);
                if ident.is_empty() {
                    return Err(unexpected(whole, '#'));
                }
                compound.id = Some(ident);
            }
            '.' => {
                i += 1;
                let ident = read_ident(&mut i);
                if ident.is_empty() {
                    return Err(unexpected(whole, '.'));
                }
                compound.classes.push(ident);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| SelectorError::UnterminatedAttribute(whole.to_string()))?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body, whole)?);
                i = close + 1;
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err(SelectorError::Combinator(whole.to_string()));
            }
            c if i == 0 && is_ident_char(c) => {
                let ident = read_ident(&mut i);
                compound.tag = Some(ident.to_ascii_lowercase());
            }
            c => return Err(unexpected(whole, c)),
        }
    }
    Ok(compound)
}

fn parse_attr(body: &str, whole: &str) -> Result<AttrMatch, SelectorError> {
    let body = body.trim();
    let (name, op, value) = if let Some((name, value)) = body.split_once("^=") {
        (name, "^=", Some(value))
    } else if let Some((name, value)) = body.split_once('=') {
        (name, "=", Some(value))
    } else {
        (body, "", None)
    };
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::UnterminatedAttribute(whole.to_string()));
    }
    let value = value.map(|v| {
        let v = v.trim();
        v.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(v)
            .to_string()
    });
    Ok(match (op, value) {
        ("^=", Some(v)) => AttrMatch::Prefix(name, v),
        ("=", Some(v)) => AttrMatch::Equals(name, v),
        _ => AttrMatch::Exists(name),
    })
}

fn unexpected(selector: &str, ch: char) -> SelectorError {
    SelectorError::UnexpectedChar {
        selector: selector.to_string(),
        ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_markup(
            r##"<nav><a href="#about" class="nav-link active">About</a><a href="/cv.pdf">CV</a></nav>
<button type="submit" data-modal="#p1">Open</button>"##,
        )
    }

    #[test]
    fn matches_tag_class_and_attributes() {
        let d = doc();
        let anchors = d.query_all(&Selector::parse("a[href^=\"#\"]").unwrap());
        assert_eq!(anchors.len(), 1);
        assert_eq!(d.text_content(anchors[0]), "About");

        let active = Selector::parse("a.nav-link.active").unwrap();
        assert_eq!(d.query(&active), Some(anchors[0]));

        let submit = Selector::parse("button[type=submit]").unwrap();
        assert!(d.query(&submit).is_some());
    }

    #[test]
    fn selector_lists_match_any_alternative() {
        let d = doc();
        let sel = Selector::parse("button, [href]").unwrap();
        assert_eq!(d.query_all(&sel).len(), 3);
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("[data-modal"),
            Err(SelectorError::UnterminatedAttribute(_))
        ));
        assert!(matches!(
            Selector::parse(".modal .body"),
            Err(SelectorError::Combinator(_))
        ));
        assert!(matches!(
            Selector::parse("div!"),
            Err(SelectorError::UnexpectedChar { ch: '!', .. })
        ));
    }

    #[test]
    fn attribute_values_may_be_quoted() {
        let d = doc();
        let sel = Selector::parse("[data-modal='#p1']").unwrap();
        assert!(d.query(&sel).is_some());
    }
}
