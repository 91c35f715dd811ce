//! Typed key/value records parsed from a frame body.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The raw text was a complete numeric literal.
    Number(f64),
    /// Anything else, kept verbatim.
    Text(String),
}

impl FieldValue {
    /// Type a raw value: numeric literals become numbers, everything else text.
    pub fn from_raw(raw: &str) -> Self {
        if is_numeric_literal(raw) {
            if let Ok(number) = raw.parse::<f64>() {
                return Self::Number(number);
            }
        }
        Self::Text(raw.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    fn integral(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                Some(*n as i64)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.integral()) {
            (_, Some(i)) => write!(f, "{i}"),
            (Self::Number(n), None) => write!(f, "{n}"),
            (Self::Text(s), None) => f.write_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self, self.integral()) {
            (_, Some(i)) => serializer.serialize_i64(i),
            (Self::Number(n), None) => serializer.serialize_f64(*n),
            (Self::Text(s), None) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An ordered field mapping for one frame.
///
/// Fields keep first-occurrence order; inserting an existing key replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value for the key if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Parse a record body into a [`Record`].
///
/// Lines without `=` (delimiters, blank lines) are skipped. The key is the
/// text before the first `=`, the value everything after it.
pub fn parse_record(body: &str) -> Record {
    let mut record = Record::new();
    for line in body.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            record.insert(key, FieldValue::from_raw(value));
        }
    }
    record
}

/// Optional sign, digits, at most one decimal point, at least one digit.
fn is_numeric_literal(raw: &str) -> bool {
    let unsigned = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);

    let mut seen_digit = false;
    let mut seen_point = false;
    for b in unsigned.bytes() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}
