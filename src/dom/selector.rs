use std::iter::Peekable;
use std::str::{Chars, FromStr};

use crate::dom::dom_model::Element;
use crate::error::PageError;

/// A compound selector: optional tag, then any mix of `.class`, `#id`,
/// `[attr]` and `[attr="value"]`. Combinators are not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    pub value: Option<String>,
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Selector {
            tag: Some(tag.to_ascii_lowercase()),
            ..Selector::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Selector {
            classes: vec![class.to_string()],
            ..Selector::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(AttrMatch {
            name: name.to_ascii_lowercase(),
            value: Some(value.to_string()),
        });
        self
    }

    pub fn parse(input: &str) -> Result<Self, PageError> {
        let unsupported = || PageError::UnsupportedSelector(input.to_string());

        let source = input.trim();
        if source.is_empty() {
            return Err(unsupported());
        }

        let mut chars = source.chars().peekable();
        let mut selector = Selector::default();

        match chars.peek().copied() {
            Some('*') => {
                chars.next();
            }
            Some(c) if is_ident_char(c) => {
                selector.tag = Some(read_ident(&mut chars).to_ascii_lowercase());
            }
            _ => {}
        }

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let class = read_ident(&mut chars);
                    if class.is_empty() {
                        return Err(unsupported());
                    }
                    selector.classes.push(class);
                }
                '#' => {
                    let id = read_ident(&mut chars);
                    if id.is_empty() || selector.id.is_some() {
                        return Err(unsupported());
                    }
                    selector.id = Some(id);
                }
                '[' => {
                    let name = read_ident(&mut chars);
                    if name.is_empty() {
                        return Err(unsupported());
                    }
                    let value = match chars.next() {
                        Some(']') => None,
                        Some('=') => {
                            let value = read_attr_value(&mut chars).ok_or_else(unsupported)?;
                            if chars.next() != Some(']') {
                                return Err(unsupported());
                            }
                            Some(value)
                        }
                        _ => return Err(unsupported()),
                    };
                    selector.attrs.push(AttrMatch {
                        name: name.to_ascii_lowercase(),
                        value,
                    });
                }
                _ => return Err(unsupported()),
            }
        }

        Ok(selector)
    }

    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }

        self.attrs.iter().all(|m| match (&m.value, element.attr(&m.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

impl FromStr for Selector {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn read_attr_value(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    match chars.peek().copied() {
        Some(quote) if quote == '"' || quote == '\'' => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next()? {
                    c if c == quote => return Some(value),
                    c => value.push(c),
                }
            }
        }
        _ => {
            let value = read_ident(chars);
            if value.is_empty() { None } else { Some(value) }
        }
    }
}
