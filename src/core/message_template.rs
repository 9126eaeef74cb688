//! Message templates with named placeholders
//!
//! A template such as `"Charge failed for {OrderId}"` is parsed once into text
//! and property tokens. Arguments are bound to placeholder names in order, and
//! the message is rendered against the final event properties.

use super::property_value::{Properties, PropertyValue};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// How an argument is captured for a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destructuring {
    /// `{Name}`: keep the value as supplied
    #[default]
    Default,
    /// `{$Name}`: capture the rendered string form
    Stringify,
    /// `{@Name}`: keep the structured shape
    Destructure,
}

/// Column alignment for a rendered placeholder (`{Name,10}`, `{Name,-10}`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Right(usize),
    Left(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyToken {
    pub name: String,
    /// The placeholder exactly as written, braces included
    pub raw: String,
    pub destructuring: Destructuring,
    pub alignment: Option<Alignment>,
    pub format: Option<String>,
    /// Index for positional placeholders such as `{0}`
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Text(String),
    Property(PropertyToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
    tokens: Vec<TemplateToken>,
}

impl MessageTemplate {
    pub fn parse(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            if rest.starts_with("{{") {
                literal.push('{');
                rest = &rest[2..];
            } else if rest.starts_with("}}") {
                literal.push('}');
                rest = &rest[2..];
            } else if c == '{' {
                match rest.find('}') {
                    Some(end) => {
                        let raw = &rest[..=end];
                        match parse_property(raw) {
                            Some(token) => {
                                if !literal.is_empty() {
                                    tokens.push(TemplateToken::Text(std::mem::take(&mut literal)));
                                }
                                tokens.push(TemplateToken::Property(token));
                            }
                            None => literal.push_str(raw),
                        }
                        rest = &rest[end + 1..];
                    }
                    None => {
                        literal.push_str(rest);
                        rest = "";
                    }
                }
            } else {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }

        if !literal.is_empty() {
            tokens.push(TemplateToken::Text(literal));
        }

        Self {
            text: text.to_string(),
            tokens,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[TemplateToken] {
        &self.tokens
    }

    pub fn property_tokens(&self) -> impl Iterator<Item = &PropertyToken> {
        self.tokens.iter().filter_map(|token| match token {
            TemplateToken::Property(property) => Some(property),
            TemplateToken::Text(_) => None,
        })
    }

    /// True when every placeholder is numeric (`{0}`, `{1}`, ...)
    pub fn is_positional(&self) -> bool {
        let mut any = false;
        for token in self.property_tokens() {
            if token.position.is_none() {
                return false;
            }
            any = true;
        }
        any
    }

    /// Bind positional arguments to placeholder names.
    ///
    /// Named templates bind in order to the distinct names; positional
    /// templates bind by index. Surplus arguments are ignored.
    pub fn bind(&self, args: impl IntoIterator<Item = PropertyValue>) -> Properties {
        let args: Vec<PropertyValue> = args.into_iter().collect();
        let mut properties = Properties::new();

        if self.is_positional() {
            for token in self.property_tokens() {
                if properties.contains_key(&token.name) {
                    continue;
                }
                if let Some(value) = token.position.and_then(|p| args.get(p)) {
                    properties.insert(token.name.clone(), capture(token, value.clone()));
                }
            }
            return properties;
        }

        let mut args = args.into_iter();
        for token in self.property_tokens() {
            if properties.contains_key(&token.name) {
                continue;
            }
            match args.next() {
                Some(value) => {
                    properties.insert(token.name.clone(), capture(token, value));
                }
                None => break,
            }
        }
        properties
    }

    /// Render the template; unbound placeholders are written as raw text
    pub fn render(&self, properties: &Properties) -> String {
        let mut output = String::with_capacity(self.text.len());
        for token in &self.tokens {
            match token {
                TemplateToken::Text(text) => output.push_str(text),
                TemplateToken::Property(property) => match properties.get(&property.name) {
                    Some(value) => render_property(&mut output, property, value),
                    None => output.push_str(&property.raw),
                },
            }
        }
        output
    }
}

fn capture(token: &PropertyToken, value: PropertyValue) -> PropertyValue {
    match token.destructuring {
        Destructuring::Stringify => PropertyValue::String(value.to_plain_string()),
        Destructuring::Default | Destructuring::Destructure => value,
    }
}

fn render_property(output: &mut String, token: &PropertyToken, value: &PropertyValue) {
    let mut rendered = String::new();
    value.render(&mut rendered, token.format.as_deref());

    let width = rendered.chars().count();
    match token.alignment {
        Some(Alignment::Right(columns)) if columns > width => {
            output.extend(std::iter::repeat(' ').take(columns - width));
            output.push_str(&rendered);
        }
        Some(Alignment::Left(columns)) if columns > width => {
            output.push_str(&rendered);
            output.extend(std::iter::repeat(' ').take(columns - width));
        }
        _ => output.push_str(&rendered),
    }
}

/// Parse `{...}` into a property token; `None` means the text is literal
fn parse_property(raw: &str) -> Option<PropertyToken> {
    let content = &raw[1..raw.len() - 1];

    let (destructuring, content) = match content.chars().next()? {
        '@' => (Destructuring::Destructure, &content[1..]),
        '$' => (Destructuring::Stringify, &content[1..]),
        _ => (Destructuring::Default, content),
    };

    let (head, format) = match content.split_once(':') {
        Some((head, format)) => (head, Some(format)),
        None => (content, None),
    };
    let (name, alignment) = match head.split_once(',') {
        Some((name, alignment)) => (name, Some(parse_alignment(alignment)?)),
        None => (head, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    if format.is_some_and(|f| f.is_empty() || f.contains('{')) {
        return None;
    }

    let position = if name.chars().all(|c| c.is_ascii_digit()) {
        Some(name.parse().ok()?)
    } else {
        None
    };

    Some(PropertyToken {
        name: name.to_string(),
        raw: raw.to_string(),
        destructuring,
        alignment,
        format: format.map(str::to_string),
        position,
    })
}

fn parse_alignment(text: &str) -> Option<Alignment> {
    let (left, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let width = digits.parse().ok()?;
    Some(if left {
        Alignment::Left(width)
    } else {
        Alignment::Right(width)
    })
}

const MAX_CACHED_TEMPLATES: usize = 1000;
const MAX_CACHED_TEMPLATE_LENGTH: usize = 1024;

/// Bounded cache of parsed templates
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: RwLock<HashMap<String, Arc<MessageTemplate>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, text: &str) -> Arc<MessageTemplate> {
        if text.len() > MAX_CACHED_TEMPLATE_LENGTH {
            return Arc::new(MessageTemplate::parse(text));
        }

        if let Some(template) = self.templates.read().get(text) {
            return Arc::clone(template);
        }

        let template = Arc::new(MessageTemplate::parse(text));
        let mut templates = self.templates.write();
        if templates.len() >= MAX_CACHED_TEMPLATES {
            templates.clear();
        }
        templates.insert(text.to_string(), Arc::clone(&template));
        template
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}
