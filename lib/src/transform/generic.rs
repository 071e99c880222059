/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde_json::Value;

use super::Context;
use crate::{
    frame::{Field, FieldType, Frame},
    query::Query,
    response::{self, ID},
};

/// Plain table of the entities' id, name and description, or of the
/// serialized entities when none of those are present.
pub(super) fn table(cx: &Context) -> Frame {
    let frame = Frame::new(cx.query.frame_name(cx.query.entity.plural()));
    let count = response::count(cx.payload).unwrap_or(cx.records.len() as u64);
    let frame = frame.with_custom("count", count);

    let Some(first) = cx.records.first() else {
        return frame;
    };

    let columns = [
        (ID, Field::number("id")),
        ("name", Field::string("name")),
        ("description", Field::string("description")),
    ];
    let mut fields = columns
        .into_iter()
        .filter(|(key, _)| first.get(key).is_some())
        .map(|(key, field)| {
            let values = cx
                .records
                .iter()
                .map(|r| r.get(key).cloned().unwrap_or(Value::Null))
                .collect();
            field.with_values(values)
        })
        .collect::<Vec<_>>();

    if fields.is_empty() {
        fields.push(
            Field::string("data").with_values(
                cx.records
                    .iter()
                    .map(|r| Value::String(r.to_string()))
                    .collect(),
            ),
        );
    }

    fields.into_iter().fold(frame, Frame::with_field)
}

/// Untransformed response: the records as a single `entities` value,
/// with the raw payload attached.
pub fn raw_frame(payload: &Value, query: &Query) -> Frame {
    let records = response::records(payload);
    let frame = Frame::new(query.frame_name(query.entity.plural()))
        .with_ref_id(query.ref_id.clone())
        .with_field(
            Field::new("entities", FieldType::Other)
                .with_values(vec![Value::Array(records.to_vec())]),
        )
        .with_custom(
            "count",
            response::count(payload).unwrap_or(records.len() as u64),
        )
        .with_custom("rawResponse", payload.clone());
    match response::next_link(payload) {
        Some(link) => frame.with_custom("nextLink", link),
        None => frame,
    }
}
