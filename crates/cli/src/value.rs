//! String → Value parsing rules for `--param name=value`.
//!
//! Values are auto-detected:
//! 1. A double-quoted JSON string → Value::String (quotes removed)
//! 2. `null` → Value::Null
//! 3. `true` / `false` → Value::Bool
//! 4. Integer pattern → Value::Int
//! 5. Float pattern → Value::Float
//! 6. Everything else → Value::String

use dbkit::{Parameter, Value};

/// Auto-detect value type from a user-supplied string.
pub fn parse_value(s: &str) -> Value {
    // Quoting forces text, e.g. "\"42\""
    if s.starts_with('"') {
        if let Ok(text) = serde_json::from_str::<String>(s) {
            return Value::String(text);
        }
    }

    match s {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if is_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Int(i);
        }
    }

    if is_float(s) {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

/// Parse `name=value` into an input parameter.
///
/// The name is taken up to the first `=`; the rest, possibly empty, is the value.
pub fn parse_param(s: &str) -> Result<Parameter, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter '{}': expected NAME=VALUE", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid parameter '{}': missing name", s));
    }
    Ok(Parameter::new(name, parse_value(value)))
}

fn is_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    if s.is_empty() {
        return false;
    }
    // Must contain a dot or exponent
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        return false;
    }
    s.bytes().all(|b| {
        b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || b == b'+' || b == b'-'
    })
}
