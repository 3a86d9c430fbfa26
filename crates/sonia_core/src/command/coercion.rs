//! Attribute type coercion table.
//!
//! Known numeric attributes are cast to their declared type; every other
//! attribute keeps the type it arrived with.

use crate::model::object::AttrValue;
use log::warn;

/// Target scalar type for a known attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Int,
    Float,
}

const COERCIONS: &[(&str, Coercion)] = &[
    ("number_rooms", Coercion::Int),
    ("number_bathrooms", Coercion::Int),
    ("max_guest", Coercion::Int),
    ("price_by_night", Coercion::Int),
    ("latitude", Coercion::Float),
    ("longitude", Coercion::Float),
];

/// Returns the declared type for `name`, if the attribute is listed.
pub fn coercion_for(name: &str) -> Option<Coercion> {
    COERCIONS
        .iter()
        .find(|(listed, _)| *listed == name)
        .map(|(_, coercion)| *coercion)
}

/// Casts `value` to the declared type of `name`.
///
/// A value that cannot be cast keeps its original form. Text that parses to
/// a non-finite float (`nan`, `inf`, overflowing literals) is not cast.
pub fn coerce(name: &str, value: AttrValue) -> AttrValue {
    let Some(coercion) = coercion_for(name) else {
        return value;
    };

    let cast = match (coercion, &value) {
        (Coercion::Int, AttrValue::Int(_)) | (Coercion::Float, AttrValue::Float(_)) => {
            Some(value.clone())
        }
        (Coercion::Int, AttrValue::Float(number)) if number.is_finite() => {
            Some(AttrValue::Int(number.trunc() as i64))
        }
        (Coercion::Int, AttrValue::Float(_)) => None,
        (Coercion::Int, AttrValue::Text(text)) => text.trim().parse().ok().map(AttrValue::Int),
        (Coercion::Float, AttrValue::Int(number)) => Some(AttrValue::Float(*number as f64)),
        (Coercion::Float, AttrValue::Text(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(AttrValue::Float),
    };

    cast.unwrap_or_else(|| {
        warn!("event=coerce module=command status=skipped attribute={name} target={coercion:?}");
        value
    })
}
