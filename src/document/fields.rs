//! Field discovery for document collections.
//!
//! Types fields from a sample of documents in extended JSON. Fields appear
//! in first-seen order; conflicting observations collapse to JSON.

use serde_json::{Map, Value};

use crate::schema::{Field, FieldType};

/// Primary key of every document.
pub const ID_FIELD: &str = "_id";

/// Type of one extended-JSON value; `None` for null.
pub fn value_type(value: &Value) -> Option<FieldType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(FieldType::Boolean),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => FieldType::Integer,
            Some(_) => FieldType::BigInt,
            None => FieldType::Double,
        }),
        Value::String(_) => Some(FieldType::String),
        Value::Array(items) => {
            let element = items.iter().find_map(value_type).unwrap_or(FieldType::Json);
            Some(FieldType::array_of(element))
        }
        Value::Object(map) => Some(wrapper_type(map).unwrap_or(FieldType::Json)),
    }
}

/// Type named by an extended-JSON wrapper such as `{"$oid": "..."}`.
fn wrapper_type(map: &Map<String, Value>) -> Option<FieldType> {
    let (key, inner) = map.iter().next()?;
    let ty = match key.as_str() {
        "$oid" => FieldType::ObjectId,
        "$date" => FieldType::Date,
        "$numberInt" => FieldType::Integer,
        "$numberLong" => FieldType::BigInt,
        "$numberDouble" => FieldType::Double,
        "$numberDecimal" => FieldType::Decimal,
        "$uuid" => FieldType::Uuid,
        // Subtype 4 is a UUID
        "$binary" => match inner.get("subType").and_then(Value::as_str) {
            Some("04") | Some("4") => FieldType::Uuid,
            _ => FieldType::Blob,
        },
        _ => return None,
    };
    // Wrappers are single-key objects, except legacy `$binary` + `$type`
    (map.len() == 1 || key == "$binary").then_some(ty)
}

/// Combine two observations of the same field.
fn merge(current: FieldType, seen: FieldType) -> FieldType {
    use FieldType::*;

    match (current, seen) {
        (a, b) if a == b => a,
        (Integer, BigInt) | (BigInt, Integer) => BigInt,
        (Integer | BigInt, Double) | (Double, Integer | BigInt) => Double,
        (Array(a), Array(b)) => match (*a, *b) {
            // Untyped elements defer to typed ones
            (Json, other) | (other, Json) => FieldType::array_of(other),
            (a, b) => FieldType::array_of(merge(a, b)),
        },
        _ => Json,
    }
}

#[derive(Debug)]
struct Observed {
    key: String,
    ty: Option<FieldType>,
    non_null: usize,
}

/// Discover fields from sampled documents.
///
/// `_id` is the primary key. A field is required when it is present and
/// non-null in every sampled document.
pub fn discover_fields(documents: &[Value]) -> Vec<Field> {
    let mut observed: Vec<Observed> = Vec::new();

    for doc in documents {
        let Some(map) = doc.as_object() else {
            continue;
        };
        for (key, value) in map {
            let index = match observed.iter().position(|o| o.key == *key) {
                Some(i) => i,
                None => {
                    observed.push(Observed {
                        key: key.clone(),
                        ty: None,
                        non_null: 0,
                    });
                    observed.len() - 1
                }
            };
            let entry = &mut observed[index];
            if let Some(ty) = value_type(value) {
                entry.non_null += 1;
                entry.ty = Some(match entry.ty.take() {
                    Some(current) => merge(current, ty),
                    None => ty,
                });
            }
        }
    }

    let total = documents.iter().filter(|d| d.is_object()).count();
    observed
        .into_iter()
        .map(|o| {
            let mut field = Field::new(&o.key, o.ty.unwrap_or(FieldType::Json));
            field.is_primary_key = o.key == ID_FIELD;
            field.is_required = total > 0 && o.non_null == total;
            field
        })
        .collect()
}
