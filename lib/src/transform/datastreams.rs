/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde_json::{json, Value};

use super::{id, observations::time_series, related, str_prop, text, Context, Table};
use crate::{
    entity::EntityKind,
    frame::{Field, Frame},
};

/// One time series per datastream with observations.
pub(super) fn series(cx: &Context) -> Vec<Frame> {
    let frames = cx
        .records
        .iter()
        .filter_map(|ds| datastream_series(cx, ds))
        .collect::<Vec<_>>();

    match frames.is_empty() {
        true => vec![Frame::new(cx.query.frame_name(EntityKind::Datastreams.plural()))],
        false => frames,
    }
}

fn datastream_series(cx: &Context, ds: &Value) -> Option<Frame> {
    let (times, values) =
        time_series(related(ds, EntityKind::Datastreams, EntityKind::Observations));

    if times.is_empty() {
        log::debug!("datastream {} has no observations", id(ds));
        return None;
    }

    let name = str_prop(ds, "name")
        .map(String::from)
        .unwrap_or_else(|| format!("Datastream {}", id(ds)));
    let unit = ds.get("unitOfMeasurement").unwrap_or(&Value::Null);
    let symbol = str_prop(unit, "symbol").unwrap_or_default();

    let value_field = match symbol {
        "" => Field::number("value").with_display_name(name.as_str()),
        _ => Field::number(symbol)
            .with_display_name(format!("{name} ({symbol})"))
            .with_unit(symbol),
    };

    let count = times.len();
    let frame = Frame::new(cx.query.frame_name(name.as_str()))
        .with_field(Field::time("time").with_values(times))
        .with_field(value_field.with_values(values))
        .with_custom("datastreamId", id(ds))
        .with_custom("datastreamName", name)
        .with_custom(
            "unitOfMeasurement",
            json!({
                "name": str_prop(unit, "name").unwrap_or("Unknown"),
                "symbol": symbol,
                "definition": str_prop(unit, "definition").unwrap_or_default(),
            }),
        )
        .with_custom("observationCount", count)
        .with_custom(
            "phenomenonTime",
            ds.get("phenomenonTime").cloned().unwrap_or(Value::Null),
        )
        .with_custom(
            "observationType",
            ds.get("observationType").cloned().unwrap_or(Value::Null),
        );
    Some(frame)
}

/// Things, Sensors or ObservedProperties joined with their datastreams.
pub(super) fn entity_datastreams(cx: &Context) -> Frame {
    let entity = cx.query.entity;
    let prefix = entity.column_prefix();
    let mut table = Table::new([
        Field::number(format!("{prefix}_id")),
        Field::string(format!("{prefix}_name")),
        Field::string(format!("{prefix}_description")),
        Field::number("datastream_id"),
        Field::string("datastream_name"),
        Field::string("datastream_description"),
        Field::string("datastream_resultTime"),
    ]);

    for parent in cx.records {
        for ds in related(parent, entity, EntityKind::Datastreams) {
            table.push_row([
                id(parent),
                text(parent, "name"),
                text(parent, "description"),
                id(ds),
                text(ds, "name"),
                text(ds, "description"),
                text(ds, "resultTime"),
            ]);
        }
    }

    table.into_frame(cx.query.frame_name(format!("{} Datastreams", entity.plural())))
}

/// Observations with their datastream.
pub(super) fn observation_datastreams(cx: &Context) -> Frame {
    let mut table = Table::new([
        Field::number("observation_id"),
        Field::number("datastream_id"),
        Field::string("datastream_name"),
        Field::string("datastream_description"),
        Field::string("datastream_resultTime"),
    ]);

    for obs in cx.records {
        for ds in related(obs, EntityKind::Observations, EntityKind::Datastreams) {
            table.push_row([
                id(obs),
                id(ds),
                text(ds, "name"),
                text(ds, "description"),
                text(ds, "resultTime"),
            ]);
        }
    }

    table.into_frame(cx.query.frame_name("Observations Datastreams"))
}
