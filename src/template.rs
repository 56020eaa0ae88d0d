use crate::event::Properties;

/// Capture hint written in front of a placeholder name (`{@Order}`, `{$Order}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureHint {
    Default,
    Destructure,
    Stringify,
}

/// One piece of a parsed [`MessageTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Text(String),
    Property {
        /// Source text including the braces, used when the property is missing.
        raw: String,
        name: String,
        format: Option<String>,
        alignment: Option<i32>,
        hint: CaptureHint,
    },
}

/// A message template kept as its original text plus parsed tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
    tokens: Vec<TemplateToken>,
}

impl MessageTemplate {
    /// Parse `text` into tokens.
    ///
    /// `{{` and `}}` are literal braces. A `{...}` that is not a valid
    /// placeholder is kept verbatim as text, as is an unterminated `{`.
    pub fn parse(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            match c {
                '{' if rest.starts_with("{{") => {
                    literal.push('{');
                    rest = &rest[2..];
                }
                '{' => match rest.find('}') {
                    Some(close) if rest[1..close].contains('{') => {
                        literal.push('{');
                        rest = &rest[1..];
                    }
                    Some(close) => {
                        let raw = &rest[..=close];
                        match parse_property(raw) {
                            Some(token) => {
                                if !literal.is_empty() {
                                    tokens.push(TemplateToken::Text(std::mem::take(&mut literal)));
                                }
                                tokens.push(token);
                            }
                            None => literal.push_str(raw),
                        }
                        rest = &rest[close + 1..];
                    }
                    None => {
                        literal.push_str(rest);
                        rest = "";
                    }
                },
                '}' if rest.starts_with("}}") => {
                    literal.push('}');
                    rest = &rest[2..];
                }
                _ => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                }
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

    /// Placeholder names in order of appearance, duplicates included.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            TemplateToken::Property { name, .. } => Some(name.as_str()),
            TemplateToken::Text(_) => None,
        })
    }

    /// Render against `properties`. Missing properties are written as their
    /// original placeholder text.
    pub fn render(&self, properties: &Properties) -> String {
        let mut out = String::with_capacity(self.text.len());
        for token in &self.tokens {
            match token {
                TemplateToken::Text(text) => out.push_str(text),
                TemplateToken::Property {
                    raw,
                    name,
                    format,
                    alignment,
                    ..
                } => match properties.get(name) {
                    Some(value) => {
                        let mut rendered = String::new();
                        value.render(format.as_deref(), &mut rendered);
                        pad(&mut out, &rendered, *alignment);
                    }
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

fn pad(out: &mut String, rendered: &str, alignment: Option<i32>) {
    let width = alignment.map(|a| a.unsigned_abs() as usize).unwrap_or(0);
    let len = rendered.chars().count();
    if len >= width {
        out.push_str(rendered);
        return;
    }
    let fill = " ".repeat(width - len);
    match alignment {
        Some(a) if a < 0 => {
            out.push_str(rendered);
            out.push_str(&fill);
        }
        _ => {
            out.push_str(&fill);
            out.push_str(rendered);
        }
    }
}

fn parse_property(raw: &str) -> Option<TemplateToken> {
    let inner = &raw[1..raw.len() - 1];
    let (hint, inner) = match inner.chars().next() {
        Some('@') => (CaptureHint::Destructure, &inner[1..]),
        Some('$') => (CaptureHint::Stringify, &inner[1..]),
        _ => (CaptureHint::Default, inner),
    };

    let (head, format) = match inner.split_once(':') {
        Some((head, format)) if !format.is_empty() => (head, Some(format.to_string())),
        Some(_) => return None,
        None => (inner, None),
    };

    let (name, alignment) = match head.split_once(',') {
        Some((name, align)) => (name, Some(align.trim().parse::<i32>().ok()?)),
        None => (head, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    Some(TemplateToken::Property {
        raw: raw.to_string(),
        name: name.to_string(),
        format,
        alignment,
        hint,
    })
}
