//! Dataset key handling
//!
//! `data-*` attributes are addressed by camelCase keys. Keys given in
//! kebab-case are normalized first, so `user-id` and `userId` name the
//! same `data-user-id` attribute.

/// `user-id` -> `userId`
pub fn to_camel_case(key: &str) -> String {
    let mut parts = key.split('-');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    out
}

/// `userId` -> `user-id`
pub fn to_kebab_case(key: &str) -> String {
    key.chars().fold(String::with_capacity(key.len() + 4), |mut out, c| {
        if c.is_ascii_uppercase() {
            out.push('-');
        }
        out.push(c.to_ascii_lowercase());
        out
    })
}

/// Attribute name backing a dataset key in either spelling
pub fn data_attribute_name(key: &str) -> String {
    format!("data-{}", to_kebab_case(&to_camel_case(key)))
}
