use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// A field value of an open-schema [`Record`].
///
/// Integers are tried before floats when deserializing, so `1` stays an `Int` and `1.0` becomes a `Float`.
/// Nested arrays and objects are not representable and fail to deserialize.
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Default, Clone, PartialEq)]
/// A mapping of field names to values, preserving insertion order.
///
/// Inserting an existing field replaces its value in place.
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `NaN` and the infinities, which have no JSON representation.
    pub fn is_non_finite(&self) -> bool {
        matches!(self, Value::Float(f) if !f.is_finite())
    }

    /// The string form of this value when used as a key.
    /// Floats keep their decimal point, so `12.0` and `12` are distinct keys.
    /// Returns `None` for `Null` and non-finite floats.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Float(f) if !f.is_finite() => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(format!("{f:?}")),
            Value::String(s) => Some(s.to_owned()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Insert a field, returning the previous value if the field already existed.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, field: K, value: V) -> Option<Value> {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == field) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == field)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Replace every value that represents "no data" (`NaN`, infinities) with an explicit `Null`,
    /// so the record serializes to well-formed JSON.
    pub fn normalize_nulls(&mut self) {
        for (_, value) in self.fields.iter_mut() {
            if value.is_non_finite() {
                *value = Value::Null;
            }
        }
    }

    /// A copy of this record without the given field.
    pub fn without(&self, field: &str) -> Record {
        Record {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| k != field)
                .cloned()
                .collect(),
        }
    }

    /// Merge all fields of `other` into this record, overwriting existing ones.
    pub fn merge(&mut self, other: &Record) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in self.fields.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
                write!(f, "a flat JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut record = Record::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    record.insert(k, v);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_order_and_replace() {
        let mut record = Record::new();
        record.insert("trip_id", "A1");
        record.insert("fare", 12.5);
        record.insert("passengers", 2);
        assert_eq!(record.insert("fare", 13.0), Some(Value::Float(12.5)));

        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, ["trip_id", "fare", "passengers"]);
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"trip_id":"A1","fare":13.0,"passengers":2}"#
        );
    }

    #[test]
    fn test_record_deserialize() {
        let record: Record =
            serde_json::from_str(r#"{"trip_id":"C3","fare":9.0,"tip":null,"paid":true,"n":4}"#)
                .unwrap();
        assert_eq!(record.get("trip_id"), Some(&Value::String("C3".into())));
        assert_eq!(record.get("fare"), Some(&Value::Float(9.0)));
        assert_eq!(record.get("tip"), Some(&Value::Null));
        assert_eq!(record.get("paid"), Some(&Value::Bool(true)));
        assert_eq!(record.get("n"), Some(&Value::Int(4)));

        assert!(serde_json::from_str::<Record>(r#"{"nested":{"a":1}}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_normalize_nulls() {
        let mut record: Record = [
            ("trip_id", Value::from("A1")),
            ("fare", Value::Float(f64::NAN)),
            ("tip", Value::Float(f64::INFINITY)),
            ("miles", Value::Float(1.5)),
        ]
        .into_iter()
        .collect();
        record.normalize_nulls();
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"trip_id":"A1","fare":null,"tip":null,"miles":1.5}"#
        );
    }

    #[test]
    fn test_key_string() {
        assert_eq!(Value::from("A1").key_string().as_deref(), Some("A1"));
        assert_eq!(Value::Int(42).key_string().as_deref(), Some("42"));
        assert_eq!(Value::Float(12.0).key_string().as_deref(), Some("12.0"));
        assert_eq!(Value::Float(12.5).key_string().as_deref(), Some("12.5"));
        assert_eq!(Value::Bool(false).key_string().as_deref(), Some("false"));
        assert_eq!(Value::Null.key_string(), None);
        assert_eq!(Value::Float(f64::NAN).key_string(), None);
    }

    #[test]
    fn test_without_and_merge() {
        let record: Record = [("trip_id", Value::from("B2")), ("fare", Value::Float(1.0))]
            .into_iter()
            .collect();
        let fields = record.without("trip_id");
        assert_eq!(fields.len(), 1);
        assert!(!fields.contains("trip_id"));

        let mut row: Record = [("trip_id", Value::from("B2")), ("vendor", Value::Int(1))]
            .into_iter()
            .collect();
        row.merge(&fields);
        assert_eq!(
            row.to_json().unwrap(),
            r#"{"trip_id":"B2","vendor":1,"fare":1.0}"#
        );
    }
}
