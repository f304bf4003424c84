// File: src/parser.rs
// Purpose: Minimal HTML subset parser for building documents

use thiserror::Error;

use crate::Document;

/// Error raised for markup the subset parser cannot make sense of.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of input inside a tag")]
    UnexpectedEof,
    #[error("malformed tag at offset {0}")]
    MalformedTag(usize),
}

/// Elements that never have children and take no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn parse(html: &str) -> Result<Document, ParseError> {
    Parser {
        chars: html.chars().collect(),
        pos: 0,
    }
    .run()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn run(mut self) -> Result<Document, ParseError> {
        let mut doc = Document::new();
        let mut stack = vec![doc.root()];

        while !self.eof() {
            if self.peek() == '<' {
                if self.lookahead("<!--") {
                    self.skip_comment()?;
                } else if self.lookahead("<!") {
                    self.skip_until('>')?;
                } else if self.lookahead("</") {
                    self.close_tag(&doc, &mut stack)?;
                } else {
                    self.open_tag(&mut doc, &mut stack)?;
                }
            } else {
                let text = self.read_text();

                // Inter-tag whitespace carries no meaning for fixtures.
                if !text.trim().is_empty() {
                    let parent = *stack.last().expect("stack holds at least the root");
                    let node = doc.create_text(&decode_entities(&text));
                    doc.append_child(parent, node);
                }
            }
        }

        Ok(doc)
    }

    fn open_tag(&mut self, doc: &mut Document, stack: &mut Vec<crate::NodeId>) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1; // consume '<'

        let tag = self.read_name();
        if tag.is_empty() {
            return Err(ParseError::MalformedTag(start));
        }

        let element = doc.create_element(&tag);
        let tag = tag.to_ascii_lowercase();

        let mut self_closing = false;

        loop {
            self.skip_whitespace();

            match self.peek_checked()? {
                '>' => {
                    self.pos += 1;
                    break;
                }
                '/' => {
                    self.pos += 1;
                    self_closing = true;
                }
                _ => {
                    let (name, value) = self.read_attribute(start)?;
                    doc.set_attr(element, &name, &value);
                }
            }
        }

        let parent = *stack.last().expect("stack holds at least the root");
        doc.append_child(parent, element);

        if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
            stack.push(element);
        }

        Ok(())
    }

    fn close_tag(&mut self, doc: &Document, stack: &mut Vec<crate::NodeId>) -> Result<(), ParseError> {
        self.pos += 2; // consume "</"

        let tag = self.read_name().to_ascii_lowercase();
        self.skip_until('>')?;

        // Pop to the matching open element; an unmatched close tag is
        // ignored rather than rejected.
        let matched = stack
            .iter()
            .skip(1)
            .rposition(|&id| doc.tag(id) == Some(tag.as_str()));

        if let Some(at) = matched {
            stack.truncate(at + 1);
        }

        Ok(())
    }

    fn read_attribute(&mut self, tag_start: usize) -> Result<(String, String), ParseError> {
        let name = self.read_name();
        if name.is_empty() {
            return Err(ParseError::MalformedTag(tag_start));
        }

        self.skip_whitespace();

        if self.eof() || self.peek() != '=' {
            // Bare attribute, e.g. `required`.
            return Ok((name, String::new()));
        }

        self.pos += 1; // consume '='
        self.skip_whitespace();

        let value = match self.peek_checked()? {
            quote @ ('"' | '\'') => {
                self.pos += 1;
                let value = self.take_while(|c| c != quote);
                if self.eof() {
                    return Err(ParseError::UnexpectedEof);
                }
                self.pos += 1; // consume closing quote
                value
            }
            _ => self.take_while(|c| !c.is_whitespace() && c != '>' && c != '/'),
        };

        Ok((name, decode_entities(&value)))
    }

    fn read_name(&mut self) -> String {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
    }

    fn read_text(&mut self) -> String {
        self.take_while(|c| c != '<')
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while !self.eof() && predicate(self.peek()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_comment(&mut self) -> Result<(), ParseError> {
        self.pos += 4; // consume "<!--"
        while !self.eof() {
            if self.lookahead("-->") {
                self.pos += 3;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(ParseError::UnexpectedEof)
    }

    fn skip_until(&mut self, target: char) -> Result<(), ParseError> {
        while !self.eof() {
            let current = self.peek();
            self.pos += 1;
            if current == target {
                return Ok(());
            }
        }
        Err(ParseError::UnexpectedEof)
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.peek().is_whitespace() {
            self.pos += 1;
        }
    }

    fn lookahead(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(offset, expected)| self.chars.get(self.pos + offset) == Some(&expected))
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_checked(&self) -> Result<char, ParseError> {
        self.chars.get(self.pos).copied().ok_or(ParseError::UnexpectedEof)
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use crate::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_elements_with_attributes() {
        let doc = Document::parse(
            r#"<form><input type="text" name="animal" value="Lion" required></form>"#,
        )
        .unwrap();

        let form = doc.first_element_child(doc.root()).unwrap();
        assert_eq!(doc.tag(form), Some("form"));

        let input = doc.first_element_child(form).unwrap();
        assert_eq!(doc.attr(input, "name"), Some("animal"));
        assert_eq!(doc.attr(input, "value"), Some("Lion"));
        assert!(doc.has_attr(input, "required"));
    }

    #[test]
    fn void_elements_take_no_children() {
        let doc = Document::parse("<div><input name=a><span>after</span></div>").unwrap();

        let div = doc.first_element_child(doc.root()).unwrap();
        let children: Vec<_> = doc
            .children(div)
            .iter()
            .filter_map(|&id| doc.tag(id))
            .collect();

        assert_eq!(children, vec!["input", "span"]);
    }

    #[test]
    fn text_content_and_entities() {
        let doc = Document::parse("<p>fish &amp; chips</p>").unwrap();
        let p = doc.first_element_child(doc.root()).unwrap();

        assert_eq!(doc.text(p), "fish & chips");
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let doc = Document::parse("<!DOCTYPE html><!-- note --><b>x</b>").unwrap();
        let b = doc.first_element_child(doc.root()).unwrap();

        assert_eq!(doc.tag(b), Some("b"));
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        assert!(Document::parse("<input name=").is_err());
    }
}
