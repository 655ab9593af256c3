use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A value decoded from a TLC state literal.
///
/// The derived ordering is total and is what canonicalization sorts by:
/// variants compare by declaration order first, then by content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Bare identifier (usually a model value) that did not resolve to anything else
    Symbol(String),
    /// `<<a, b>>`
    Seq(Vec<Value>),
    /// `{a, b}`
    Set(Vec<Value>),
    /// `[k |-> v, ...]`
    Record(Vec<(String, Value)>),
    /// `(k :> v @@ ...)`
    Function(Vec<(Value, Value)>),
}

impl Value {
    /// Build a record, keeping the last value when a key repeats
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut out = Vec::new();
        for (key, value) in entries {
            insert_entry(&mut out, key.into(), value);
        }
        Value::Record(out)
    }

    /// Build a function, keeping the last value when a key repeats
    pub fn function<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut out = Vec::new();
        for (key, value) in entries {
            insert_entry(&mut out, key, value);
        }
        Value::Function(out)
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    /// Short variant name, used in error messages and debug output
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Seq(_) => "sequence",
            Value::Set(_) => "set",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String content of a `Str` or `Symbol`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a `Seq` or `Set`
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Field lookup on a record
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Application of a function to `key`
    pub fn apply(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Function(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Key used when a function is exported as a JSON object
    fn json_key(&self) -> String {
        match self {
            Value::Str(s) | Value::Symbol(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Insert into an association list, last write wins.
pub(crate) fn insert_entry<K: PartialEq, V>(entries: &mut Vec<(K, V)>, key: K, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_joined<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
    mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        each(f, item)?;
    }
    Ok(())
}

/// Renders the TLC literal syntax the decoder reads back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write_escaped(f, s),
            Value::Symbol(s) => f.write_str(s),
            Value::Seq(items) => {
                f.write_str("<<")?;
                write_joined(f, items, ", ", |f, v| write!(f, "{}", v))?;
                f.write_str(">>")
            }
            Value::Set(items) => {
                f.write_str("{")?;
                write_joined(f, items, ", ", |f, v| write!(f, "{}", v))?;
                f.write_str("}")
            }
            Value::Record(entries) => {
                f.write_str("[")?;
                write_joined(f, entries, ", ", |f, (k, v)| write!(f, "{} |-> {}", k, v))?;
                f.write_str("]")
            }
            // TLC prints the empty function as the empty sequence
            Value::Function(entries) if entries.is_empty() => f.write_str("<<>>"),
            Value::Function(entries) => {
                f.write_str("(")?;
                write_joined(f, entries, " @@ ", |f, (k, v)| write!(f, "{} :> {}", k, v))?;
                f.write_str(")")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Str(s) | Value::Symbol(s) => serializer.serialize_str(s),
            Value::Seq(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Function(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&k.json_key(), v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_last_write_wins() {
        let rec = Value::record([("a", Value::Int(1)), ("b", Value::Int(2)), ("a", Value::Int(3))]);
        assert_eq!(rec.field("a"), Some(&Value::Int(3)));
        assert_eq!(rec.field("b"), Some(&Value::Int(2)));
        if let Value::Record(entries) = &rec {
            assert_eq!(entries.len(), 2);
        }
    }

    #[test]
    fn test_display_literals() {
        let v = Value::record([
            ("a", Value::Int(-1)),
            ("b", Value::Seq(vec![Value::Bool(true), Value::str("x\"y")])),
            ("c", Value::Set(vec![Value::symbol("m1")])),
            ("d", Value::function([(Value::Int(1), Value::Bool(false))])),
        ]);
        assert_eq!(
            v.to_string(),
            r#"[a |-> -1, b |-> <<TRUE, "x\"y">>, c |-> {m1}, d |-> (1 :> FALSE)]"#
        );
    }

    #[test]
    fn test_empty_containers_display() {
        assert_eq!(Value::Seq(vec![]).to_string(), "<<>>");
        assert_eq!(Value::Set(vec![]).to_string(), "{}");
        assert_eq!(Value::Function(vec![]).to_string(), "<<>>");
    }

    #[test]
    fn test_function_serializes_as_object() {
        let f = Value::function([
            (Value::Int(1), Value::str("one")),
            (Value::symbol("p"), Value::Int(2)),
        ]);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json, serde_json::json!({"1": "one", "p": 2}));
    }

    #[test]
    fn test_set_serializes_as_array() {
        let s = Value::Set(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(serde_json::to_string(&s).unwrap(), "[1,2]");
    }
}
