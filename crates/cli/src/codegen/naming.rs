//! Identifier derivation for generated code.

use serde::Deserialize;

/// How a column name becomes a property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    /// `GROUP_ID` → `GroupId`
    #[default]
    SnakeToCamel,
    /// `groupId` → `GroupId`; the rest of the name is kept as-is
    FirstUpper,
}

/// Property name of a column under `style`.
pub fn property_name(column: &str, style: NameStyle) -> String {
    match style {
        NameStyle::SnakeToCamel => column
            .split('_')
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect::<String>(),
                    None => String::new(),
                }
            })
            .collect(),
        NameStyle::FirstUpper => upper_first(column),
    }
}

/// Name a parameter is bound under: the property name, first letter lowered.
pub fn parameter_name(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rust field or module name for an identifier in any casing.
///
/// `GroupId` → `group_id`, `GROUP_ID` → `group_id`, `HTTPCode` → `http_code`.
/// Characters outside `[A-Za-z0-9_]` become `_`; keywords are escaped as raw
/// identifiers.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            push_separator(&mut out);
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower)
            {
                push_separator(&mut out);
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    let trimmed = out.trim_matches('_');
    let ident = if trimmed.is_empty() {
        "field".to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };

    if is_keyword(&ident) {
        match ident.as_str() {
            // Cannot be raw identifiers
            "self" | "super" | "crate" | "Self" => format!("{}_", ident),
            _ => format!("r#{}", ident),
        }
    } else {
        ident
    }
}

/// Whether `name` can name a generated struct.
pub fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_keyword(name)
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "yield"
    )
}
