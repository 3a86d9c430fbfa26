//! `create` argument resolution.
//!
//! Malformed parameter tokens are skipped rather than rejected, so a valid
//! prefix of a command line still creates an object.

use super::target::resolve_class;
use super::token::classify;
use super::CommandError;
use crate::model::object::{AttrValue, ClassName};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static CLASS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("valid class name regex"));

/// Typed request produced from `create` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub class: ClassName,
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Resolves `<Class> [name=value ...]`.
pub fn resolve_create(args: &str) -> Result<CreateRequest, CommandError> {
    let args = args.trim();
    let (class_text, params) = match CLASS_NAME_RE.find(args) {
        Some(found) => (found.as_str(), args[found.end()..].trim()),
        None => (args, ""),
    };

    let mut attributes = BTreeMap::new();
    for token in params.split(' ').filter(|token| !token.is_empty()) {
        match classify(token) {
            Some((name, value)) => {
                attributes.insert(name, value);
            }
            None => debug!(
                "event=create_param module=command status=skipped token_len={}",
                token.len()
            ),
        }
    }

    let class = resolve_class(class_text)?;
    Ok(CreateRequest { class, attributes })
}
