use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use trip_relay_types::{Record, Value};

use crate::AwsErr;

/// A DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

/// Convert a value to its DynamoDB attribute. Numbers become `N`, non-finite floats become `NULL`.
pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Int(i) => AttributeValue::N(i.to_string()),
        Value::Float(f) if f.is_finite() => AttributeValue::N(f.to_string()),
        Value::Float(_) => AttributeValue::Null(true),
        Value::String(s) => AttributeValue::S(s.to_owned()),
    }
}

/// Convert a value used as a table key. Only strings and finite numbers are valid keys.
pub fn to_key_attribute(value: &Value) -> Result<AttributeValue, AwsErr> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(AttributeValue::S(s.to_owned())),
        Value::Int(_) => Ok(to_attribute(value)),
        Value::Float(f) if f.is_finite() => Ok(to_attribute(value)),
        _ => Err(AwsErr::UnsupportedAttribute(format!(
            "{value} cannot be a key"
        ))),
    }
}

/// Convert a DynamoDB attribute back to a value. Sets, lists, maps and binaries are not supported.
pub fn from_attribute(attr: &AttributeValue) -> Result<Value, AwsErr> {
    match attr {
        AttributeValue::S(s) => Ok(Value::String(s.to_owned())),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::N(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Ok(Value::Int(i))
            } else {
                n.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| AwsErr::UnsupportedAttribute(format!("N({n})")))
            }
        }
        other => Err(AwsErr::UnsupportedAttribute(format!("{other:?}"))),
    }
}

/// Convert an item to a record, dropping the attributes that have no [`Value`] counterpart.
/// Field order follows the attribute names, since items are unordered.
pub fn from_item(item: &Item) -> Record {
    let mut names: Vec<&String> = item.keys().collect();
    names.sort();
    let mut record = Record::new();
    for name in names {
        match from_attribute(&item[name]) {
            Ok(value) => {
                record.insert(name.as_str(), value);
            }
            Err(e) => log::debug!("Dropping attribute {name}: {e}"),
        }
    }
    record
}
