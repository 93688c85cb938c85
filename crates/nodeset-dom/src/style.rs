//! Inline style
//!
//! Declarations held in an element's `style` attribute, plus the
//! user-agent default `display` per tag used when no inline value is set.

/// Ordered `property: value` pairs from a `style` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    decls: Vec<(String, String)>,
}

impl StyleDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. Semicolons inside quotes or
    /// parentheses do not split declarations.
    pub fn parse(style_attr: &str) -> Self {
        let mut decls = Vec::new();
        let mut start = 0;
        let mut paren_depth = 0usize;
        let mut quote: Option<char> = None;

        for (i, ch) in style_attr.char_indices() {
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => quote = Some(ch),
                (None, '(') => paren_depth += 1,
                (None, ')') => paren_depth = paren_depth.saturating_sub(1),
                (None, ';') if paren_depth == 0 => {
                    push_declaration(&mut decls, &style_attr[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        push_declaration(&mut decls, &style_attr[start..]);

        Self { decls }
    }

    /// Value of a property (kebab-case or camelCase)
    pub fn get(&self, property: &str) -> Option<&str> {
        let name = css_property_name(property);
        self.decls.iter()
            .rev()
            .find(|(prop, _)| *prop == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a property; an empty value removes it
    pub fn set(&mut self, property: &str, value: &str) {
        let name = css_property_name(property);
        let value = value.trim();
        match self.decls.iter().position(|(prop, _)| *prop == name) {
            Some(pos) if value.is_empty() => {
                self.decls.remove(pos);
            }
            Some(pos) => self.decls[pos].1 = value.to_string(),
            None if !value.is_empty() => self.decls.push((name, value.to_string())),
            None => {}
        }
    }

    /// Remove a property
    pub fn remove(&mut self, property: &str) {
        self.set(property, "");
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for StyleDeclarations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, (name, value)) in self.decls.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

fn push_declaration(decls: &mut Vec<(String, String)>, raw: &str) {
    let Some((name, value)) = raw.split_once(':') else {
        return;
    };
    let name = name.trim().to_ascii_lowercase();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return;
    }
    decls.push((name, value.to_string()));
}

/// CSS property name for a camelCase or kebab-case spelling
pub fn css_property_name(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len() + 2);
    for ch in prop.trim().chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// User-agent default `display` for a tag
pub fn default_display(tag: &str) -> &'static str {
    match tag {
        "head" | "script" | "style" | "template" | "title" | "meta" | "link" | "base" => "none",
        "li" => "list-item",
        "table" => "table",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "thead" => "table-header-group",
        "tbody" => "table-row-group",
        "tfoot" => "table-footer-group",
        "a" | "span" | "em" | "strong" | "b" | "i" | "u" | "small" | "code" | "label"
        | "abbr" | "cite" | "sub" | "sup" | "img" | "input" | "select" | "textarea"
        | "button" | "br" | "svg" | "canvas" | "video" | "audio" | "iframe" => "inline",
        _ => "block",
    }
}
