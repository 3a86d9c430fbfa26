//! Parameter token classification for `create`.
//!
//! A token has the shape `name=value` where `value` is a double-quoted
//! string, a signed decimal-point literal or a signed integer literal.

use crate::model::object::AttrValue;
use once_cell::sync::Lazy;
use regex::Regex;

static PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)=(?:"(?P<text>.*)"|(?P<float>[-+]?[0-9]+\.[0-9]+)|(?P<int>[-+]?[0-9]+))$"#,
    )
    .expect("valid parameter regex")
});

/// Classifies one `name=value` token.
///
/// Returns `None` when the token does not follow the parameter grammar,
/// including integer literals that overflow `i64` and float literals too
/// large to be finite.
pub fn classify(token: &str) -> Option<(String, AttrValue)> {
    let captures = PARAM_RE.captures(token)?;
    let name = captures.name("name")?.as_str().to_string();

    let value = if let Some(text) = captures.name("text") {
        AttrValue::Text(unquote_text(text.as_str()))
    } else if let Some(float) = captures.name("float") {
        let number: f64 = float.as_str().parse().ok()?;
        if !number.is_finite() {
            return None;
        }
        AttrValue::Float(number)
    } else {
        AttrValue::Int(captures.name("int")?.as_str().parse().ok()?)
    };

    Some((name, value))
}

/// Decodes the interior of a quoted value: `_` stands for a space and `\"`
/// for a literal double quote.
pub fn unquote_text(interior: &str) -> String {
    interior.replace('_', " ").replace("\\\"", "\"")
}
