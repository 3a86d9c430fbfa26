//! `update` argument resolution.
//!
//! The tail after `<Class> <id>` takes one of two forms:
//! - a map literal, which may set any number of attributes;
//! - a positional `name value` pair, which sets exactly one attribute.
//!   Tokens after the first pair are ignored.

use super::coercion::coerce;
use super::map_literal::parse_map_literal;
use super::target::resolve_class;
use super::{partition_space, CommandError};
use crate::model::object::{AttrValue, ObjectKey};

/// Parsed argument tail of an `update` command.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateArgs {
    /// Pairs taken from a map literal, in source order.
    Bulk(Vec<(String, AttrValue)>),
    /// One positional pair; both parts are raw text.
    Single { name: String, value: String },
}

impl UpdateArgs {
    /// Validates every pair and applies the coercion table.
    ///
    /// Fails on the first pair with an empty name or an empty value.
    pub fn into_pairs(self) -> Result<Vec<(String, AttrValue)>, CommandError> {
        let pairs = match self {
            Self::Bulk(pairs) => pairs,
            Self::Single { name, value } => vec![(name, AttrValue::Text(value))],
        };

        pairs
            .into_iter()
            .map(|(name, value)| {
                if name.is_empty() {
                    return Err(CommandError::AttributeNameMissing);
                }
                if value.is_empty_text() {
                    return Err(CommandError::ValueMissing);
                }
                let value = coerce(&name, value);
                Ok((name, value))
            })
            .collect()
    }
}

/// Typed request produced from `update` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub key: ObjectKey,
    pub args: UpdateArgs,
}

/// Resolves `<Class> <id> <tail>`.
///
/// Only class and id problems are reported here; attribute problems surface
/// from [`UpdateArgs::into_pairs`] once the target is known to exist.
pub fn resolve_update(args: &str) -> Result<UpdateRequest, CommandError> {
    let (class_text, rest) = partition_space(args);
    let class = resolve_class(class_text)?;

    let (id, tail) = partition_space(rest);
    if id.is_empty() {
        return Err(CommandError::InstanceIdMissing);
    }

    Ok(UpdateRequest {
        key: ObjectKey::new(class, id),
        args: parse_update_args(tail),
    })
}

/// Picks the map or positional form for an update tail.
pub fn parse_update_args(tail: &str) -> UpdateArgs {
    let trimmed = tail.trim();
    if let (Some(open), Some(close)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if open < close {
            if let Ok(pairs) = parse_map_literal(&trimmed[open..=close]) {
                return UpdateArgs::Bulk(pairs);
            }
        }
    }

    let remaining = tail.trim_start();
    let (quoted_name, remaining) = take_quoted(remaining);
    let (head, remaining) = partition_space(remaining);
    let name = quoted_name.unwrap_or(head);

    let (quoted_value, _) = take_quoted(remaining);
    let value = quoted_value.unwrap_or_else(|| partition_space(remaining).0);

    UpdateArgs::Single {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Splits a leading double-quoted span off `text`.
///
/// Without a closing quote the span runs to the end of `text`.
fn take_quoted(text: &str) -> (Option<&str>, &str) {
    let Some(inner) = text.strip_prefix('"') else {
        return (None, text);
    };
    match inner.find('"') {
        Some(end) => (Some(&inner[..end]), &inner[end + 1..]),
        None => (Some(inner), ""),
    }
}
