// File: src/selector.rs
// Purpose: Compound attribute selectors over the document arena

use thiserror::Error;

use crate::{Document, NodeId};

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("malformed selector '{0}'")]
    Malformed(String),
}

/// A parsed selector: comma-separated alternatives of compound parts,
/// e.g. `input[type='radio'][name], select[name]`.
///
/// Only the shapes the engine queries with are supported: an optional
/// tag name followed by `[attr]` / `[attr='value']` tests. There is no
/// combinator or pseudo-class support.
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone)]
struct Compound {
    tag: Option<String>,
    tests: Vec<AttrTest>,
}

#[derive(Debug, Clone)]
struct AttrTest {
    name: String,
    /// `None` tests for presence only.
    value: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let alternatives = input
            .split(',')
            .map(|part| Compound::parse(part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        if alternatives.is_empty() {
            return Err(SelectorError::Empty);
        }

        Ok(Self { alternatives })
    }

    /// Whether the element matches any alternative.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|compound| compound.matches(doc, node))
    }
}

impl Compound {
    fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }

        let tag_end = input.find('[').unwrap_or(input.len());
        let tag = match input[..tag_end].trim() {
            "" | "*" => None,
            name if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
                Some(name.to_ascii_lowercase())
            }
            _ => return Err(SelectorError::Malformed(input.to_string())),
        };

        let mut tests = Vec::new();
        let mut rest = &input[tag_end..];

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(SelectorError::Malformed(input.to_string()));
            }

            let close = rest
                .find(']')
                .ok_or_else(|| SelectorError::Malformed(input.to_string()))?;
            let body = &rest[1..close];
            rest = &rest[close + 1..];

            let test = match body.split_once('=') {
                Some((name, value)) => AttrTest {
                    name: name.trim().to_ascii_lowercase(),
                    value: Some(unquote(value.trim()).to_string()),
                },
                None => AttrTest {
                    name: body.trim().to_ascii_lowercase(),
                    value: None,
                },
            };

            if test.name.is_empty() {
                return Err(SelectorError::Malformed(input.to_string()));
            }

            tests.push(test);
        }

        Ok(Self { tag, tests })
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };

        if let Some(wanted) = &self.tag {
            if tag != wanted {
                return false;
            }
        }

        self.tests.iter().all(|test| match &test.value {
            Some(value) => doc.attr(node, &test.name) == Some(value.as_str()),
            None => doc.has_attr(node, &test.name),
        })
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();

    if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document::parse(
            r#"<form>
                <input type="radio" name="car" value="ford" checked>
                <input type="radio" name="car" value="bmw">
                <input type="checkbox" name="terms">
                <select name="pets[]"><option value="cat" selected>Cat</option></select>
            </form>"#,
        )
        .unwrap()
    }

    #[test]
    fn matches_tag_and_attribute_value() {
        let doc = doc();
        let selector = Selector::parse("input[type='radio'][name='car']").unwrap();

        assert_eq!(doc.select(doc.root(), &selector).len(), 2);
    }

    #[test]
    fn presence_test_and_alternatives() {
        let doc = doc();
        let selector = Selector::parse("input[checked], select[name]").unwrap();
        let found = doc.select(doc.root(), &selector);

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn bare_attribute_selector_matches_any_tag() {
        let doc = doc();
        let selector = Selector::parse("[name]").unwrap();

        assert_eq!(doc.select(doc.root(), &selector).len(), 4);
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("input[unclosed").is_err());
        assert!(Selector::parse("in..put").is_err());
    }
}
