use crate::imports::*;
use serde::{Deserialize, Serialize};

/*
    Types:
    * ShotId - Opaque integer identifying one experimental discharge
    * FieldValue - A value stored under a field name on a Record
    * Record - Per-shot accumulator of fetched/derived fields and errors
*/

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ShotId(pub i64);

impl std::fmt::Display for ShotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ShotId {
    fn from(value: i64) -> Self {
        ShotId(value)
    }
}

impl From<i32> for ShotId {
    fn from(value: i32) -> Self {
        ShotId(value as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Series(Vec<f64>),
    Signal(SignalResult),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            FieldValue::Series(s) => Some(s),
            FieldValue::Signal(sig) => Some(&sig.data),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<&SignalResult> {
        match self {
            FieldValue::Signal(sig) => Some(sig),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(value: Vec<f64>) -> Self {
        FieldValue::Series(value)
    }
}

impl From<SignalResult> for FieldValue {
    fn from(value: SignalResult) -> Self {
        FieldValue::Signal(value)
    }
}

/// Per-shot accumulator. Created fresh by a backend when processing begins for
/// a shot; all stage side effects are confined to this one instance, which is
/// what makes per-shot parallelism safe.
///
/// Invariant: a field name is never present in `fields` and `errors` at the
/// same time. `set` clears a prior error, `set_error` removes a prior value.
#[derive(Debug, Clone)]
pub struct Record {
    shot: ShotId,
    fields: HashMap<String, FieldValue>,
    errors: HashMap<String, RecordError>,
}

impl Record {
    pub fn new(shot: ShotId) -> Self {
        Self {
            shot,
            fields: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn shot(&self) -> ShotId {
        self.shot
    }

    /// Never panics and never errors; a missing or errored field is `None`.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn get_or<'a>(&'a self, field: &str, default: &'a FieldValue) -> &'a FieldValue {
        self.fields.get(field).unwrap_or(default)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        self.errors.remove(&field);
        self.fields.insert(field, value.into());
    }

    pub fn set_error(&mut self, field: impl Into<String>, error: impl Into<RecordError>) {
        let field = field.into();
        self.fields.remove(&field);
        self.errors.insert(field, error.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn errors(&self) -> impl Iterator<Item = (&String, &RecordError)> {
        self.errors.iter()
    }

    pub fn error(&self, field: &str) -> Option<&RecordError> {
        self.errors.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Prune `fields` to exactly `names`. Errors are untouched.
    pub(crate) fn keep(&mut self, names: &[String]) {
        self.fields.retain(|key, _| names.iter().any(|n| n == key));
    }

    /// Remove exactly `names` from `fields`. Errors are untouched.
    pub(crate) fn discard(&mut self, names: &[String]) {
        for name in names {
            self.fields.remove(name);
        }
    }

    pub(crate) fn take_errors(&mut self) -> HashMap<String, RecordError> {
        std::mem::take(&mut self.errors)
    }
}
