/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use schemars::schema::{InstanceType, Schema, SchemaObject};

/// Schema for a type serialized as one of a fixed set of strings.
pub(crate) fn string_enum<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        enum_values: Some(values.into_iter().map(serde_json::Value::from).collect()),
        ..Default::default()
    }
    .into()
}
