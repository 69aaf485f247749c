use std::collections::BTreeMap;
use std::fmt;

/// Object entries, kept sorted by key. A repeated key replaces the earlier entry.
pub type Object = BTreeMap<String, Value>;

pub type Array = Vec<Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Every JSON number, integers included. Integers beyond 2^53 lose precision.
    Number(f64),
    /// The raw text between the quotes. Escape sequences are kept as written.
    String(String),
    Object(Object),
    Array(Array),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    fn mismatch(&self, expected: ValueKind) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.mismatch(ValueKind::Bool)),
        }
    }

    pub fn as_number(&self) -> Result<f64, Error> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(self.mismatch(ValueKind::Number)),
        }
    }

    pub fn as_str(&self) -> Result<&str, Error> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch(ValueKind::String)),
        }
    }

    pub fn as_object(&self) -> Result<&Object, Error> {
        match self {
            Value::Object(o) => Ok(o),
            _ => Err(self.mismatch(ValueKind::Object)),
        }
    }

    pub fn as_array(&self) -> Result<&Array, Error> {
        match self {
            Value::Array(a) => Ok(a),
            _ => Err(self.mismatch(ValueKind::Array)),
        }
    }

    /// Looks up `key` when this is an object. Any other variant yields `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(o) => o.get(key),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

pub mod prelude {
    pub use super::{Array, Error as ValueError, Object, Value, ValueKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Value> {
        vec![
            Value::Null,
            Value::Bool(true),
            Value::Number(1.5),
            Value::from("s"),
            Value::Object(Object::new()),
            Value::Array(vec![]),
        ]
    }

    #[test]
    fn exactly_one_predicate_holds() {
        for value in samples() {
            let hits = [
                value.is_null(),
                value.is_bool(),
                value.is_number(),
                value.is_string(),
                value.is_object(),
                value.is_array(),
            ];
            assert_eq!(hits.iter().filter(|&&h| h).count(), 1, "{:?}", value);
        }
    }

    #[test]
    fn projections_of_matching_variant() {
        assert_eq!(Value::Bool(false).as_bool(), Ok(false));
        assert_eq!(Value::Number(2.0).as_number(), Ok(2.0));
        assert_eq!(Value::from("abc").as_str(), Ok("abc"));
        assert!(Value::Object(Object::new()).as_object().unwrap().is_empty());
        assert_eq!(Value::from(vec![Value::Null]).as_array().unwrap().len(), 1);
    }

    #[test]
    fn projections_never_coerce() {
        assert_eq!(
            Value::from("1").as_number(),
            Err(Error::TypeMismatch {
                expected: ValueKind::Number,
                found: ValueKind::String,
            })
        );
        assert_eq!(
            Value::Number(0.0).as_bool(),
            Err(Error::TypeMismatch {
                expected: ValueKind::Bool,
                found: ValueKind::Number,
            })
        );
        assert!(Value::Null.as_str().is_err());
        assert!(Value::Array(vec![]).as_object().is_err());
        assert!(Value::Object(Object::new()).as_array().is_err());
    }

    #[test]
    fn mismatch_message_names_both_kinds() {
        let err = Value::Null.as_array().unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected array, found null");
    }

    #[test]
    fn get_on_object_and_non_object() {
        let mut o = Object::new();
        o.insert("k".to_string(), Value::Bool(true));
        let value = Value::from(o);
        assert_eq!(value.get("k"), Some(&Value::Bool(true)));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::Array(vec![]).get("k"), None);
    }
}
