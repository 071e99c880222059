/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ID: &str = "@iot.id";
pub const COUNT: &str = "@iot.count";
pub const NEXT_LINK: &str = "@iot.nextLink";

/// The complete result of a paginated fetch.
#[derive(Serialize, Deserialize, Clone, PartialEq, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub items: Vec<Value>,
    pub total_count: u64,
    /// Number of top-level pages fetched.
    pub pages: usize,
    /// The request addressed a single entity.
    pub single: bool,
}

impl PagedResult {
    pub fn single(entity: Value) -> Self {
        Self {
            items: vec![entity],
            total_count: 1,
            pages: 1,
            single: true,
        }
    }

    /// Rebuild a response payload: the entity itself for single-entity
    /// results, a collection envelope otherwise.
    pub fn to_payload(&self) -> Value {
        match (self.single, self.items.as_slice()) {
            (true, [entity]) => entity.clone(),
            _ => serde_json::json!({
                "value": self.items,
                COUNT: self.total_count,
            }),
        }
    }
}

/// True if the payload is a collection envelope.
pub fn is_collection(payload: &Value) -> bool {
    payload.get("value").is_some_and(Value::is_array)
}

/// Records of a payload: the `value` array of a collection, or the
/// payload itself for a single entity.
pub fn records(payload: &Value) -> &[Value] {
    match payload {
        Value::Object(obj) => match obj.get("value") {
            Some(Value::Array(items)) => items.as_slice(),
            _ if obj.is_empty() => &[],
            _ => std::slice::from_ref(payload),
        },
        _ => &[],
    }
}

pub fn next_link(obj: &Value) -> Option<&str> {
    obj.get(NEXT_LINK).and_then(Value::as_str)
}

pub fn count(obj: &Value) -> Option<u64> {
    obj.get(COUNT).and_then(Value::as_u64)
}

/// Continuation link key of a nested collection.
pub fn nested_next_link_key(name: &str) -> String {
    format!("{name}{NEXT_LINK}")
}
