//! Domain object model.
//!
//! # Responsibility
//! - Define the closed class registry (`ClassName`).
//! - Define typed attribute values and the canonical object record.
//! - Render the stable string representation used by `show` and `all`.
//!
//! # Invariants
//! - `id` is opaque and never changes after construction.
//! - `attributes` never contains a reserved name.
//! - `updated_at` is refreshed by `touch()` on every save.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Attribute names managed by the object itself or by the backend.
pub const RESERVED_ATTRIBUTES: &[&str] = &["id", "created_at", "updated_at", "__class__"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Returns whether `name` is reserved and must not be set as ordinary data.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// Fixed registry of domain classes, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassName {
    BaseModel,
    User,
    Place,
    State,
    City,
    Amenity,
    Review,
}

impl ClassName {
    /// Every known class, in registry order.
    pub const ALL: [ClassName; 7] = [
        ClassName::BaseModel,
        ClassName::User,
        ClassName::Place,
        ClassName::State,
        ClassName::City,
        ClassName::Amenity,
        ClassName::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::Place => "Place",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Review => "Review",
        }
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a class name is not part of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownClass(pub String);

impl Display for UnknownClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown class `{}`", self.0)
    }
}

impl Error for UnknownClass {}

impl FromStr for ClassName {
    type Err = UnknownClass;

    /// Exact, case-sensitive lookup against the registry.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ClassName::ALL
            .into_iter()
            .find(|class| class.as_str() == value)
            .ok_or_else(|| UnknownClass(value.to_string()))
    }
}

/// Typed attribute value.
///
/// Deserialization tries integer before float so JSON `5` stays an integer
/// and `5.0` stays a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Returns the textual payload when this value is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns whether this value is an empty string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(value) if value.is_empty())
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            // Debug keeps the fractional part (`2.0`, not `2`).
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Text(value) => f.write_str(&quote_text(value)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Composite `Class.id` key addressing one stored object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub class: ClassName,
    pub id: String,
}

impl ObjectKey {
    pub fn new(class: ClassName, id: impl Into<String>) -> Self {
        Self {
            class,
            id: id.into(),
        }
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.class, self.id)
    }
}

impl FromStr for ObjectKey {
    type Err = UnknownClass;

    /// Splits at the first `.`; the id part may itself contain dots.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (class, id) = value
            .split_once('.')
            .ok_or_else(|| UnknownClass(value.to_string()))?;
        Ok(Self::new(class.parse()?, id))
    }
}

/// Canonical record for every console-managed object.
///
/// Serialized as one flat JSON object: `__class__`, `id`, both timestamps and
/// the free-form attributes side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainObject {
    #[serde(rename = "__class__")]
    pub class: ClassName,
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl DomainObject {
    /// Creates an empty object with a generated id and fresh timestamps.
    pub fn new(class: ClassName) -> Self {
        Self::with_id(class, Uuid::new_v4().to_string())
    }

    /// Creates an empty object with a caller-provided id.
    pub fn with_id(class: ClassName, id: impl Into<String>) -> Self {
        let now = now();
        Self {
            class,
            id: id.into(),
            created_at: now,
            updated_at: now,
            attributes: BTreeMap::new(),
        }
    }

    /// Constructs an object from a full attribute mapping.
    ///
    /// `id`, `created_at` and `updated_at` are taken from the mapping when
    /// present; a missing id is generated and a missing or unparseable
    /// timestamp defaults to now. `__class__` is ignored.
    pub fn from_attributes(class: ClassName, attributes: BTreeMap<String, AttrValue>) -> Self {
        let mut object = Self::new(class);
        for (name, value) in attributes {
            match name.as_str() {
                "id" => object.id = attr_to_plain_text(&value),
                "created_at" => object.created_at = parse_timestamp_attr(&value),
                "updated_at" => object.updated_at = parse_timestamp_attr(&value),
                "__class__" => {}
                _ => {
                    object.attributes.insert(name, value);
                }
            }
        }
        object
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.class, self.id.clone())
    }

    /// Sets one attribute. Returns `false` and leaves the object untouched
    /// when `name` is reserved.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttrValue) -> bool {
        let name = name.into();
        if is_reserved(&name) {
            return false;
        }
        self.attributes.insert(name, value);
        true
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now();
    }
}

impl Display for DomainObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'id': {}, 'created_at': '{}', 'updated_at': '{}'",
            self.class,
            self.id,
            AttrValue::Text(self.id.clone()),
            format_timestamp(&self.created_at),
            format_timestamp(&self.updated_at)
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", {}: {value}", quote_text(name))?;
        }
        f.write_str("}")
    }
}

/// Quotes `text` as a string literal for display.
///
/// Single quotes are used unless the text contains a single quote and no
/// double quote. Backslashes, control whitespace and the chosen quote are
/// escaped.
pub fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == quote => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(quote);
    quoted
}

/// Current local time, the clock used for both object timestamps.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Formats a timestamp as ISO-8601 with microsecond precision.
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses an ISO-8601 timestamp with optional fractional seconds.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    value.trim().parse::<NaiveDateTime>().ok()
}

fn attr_to_plain_text(value: &AttrValue) -> String {
    match value {
        AttrValue::Text(text) => text.clone(),
        AttrValue::Int(number) => number.to_string(),
        AttrValue::Float(number) => format!("{number:?}"),
    }
}

fn parse_timestamp_attr(value: &AttrValue) -> NaiveDateTime {
    value
        .as_text()
        .and_then(parse_timestamp)
        .unwrap_or_else(|| {
            log::warn!(
                "event=timestamp_parse module=model status=fallback value={}",
                attr_to_plain_text(value)
            );
            now()
        })
}

mod timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{text}`")))
    }
}
