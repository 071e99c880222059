/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde_json::Value;

use super::{id, record_geometry, record_time, related, text, Context, Table};
use crate::{
    entity::EntityKind,
    frame::{Field, Frame},
};

const LOCATION: &str = "location";
const FEATURE: &str = "feature";

fn geojson() -> Field {
    Field::string("geojson").with_display_name("Geometry")
}

pub(super) fn thing_locations(cx: &Context) -> Frame {
    let mut table = Table::new([
        geojson(),
        Field::number("thing_id").with_display_name("Thing ID"),
        Field::string("thing_name").with_display_name("Thing Name"),
        Field::string("thing_description").with_display_name("Thing Description"),
        Field::string("location_name").with_display_name("Location Name"),
        Field::string("location_type").with_display_name("Geometry Type"),
    ]);

    for thing in cx.records {
        for location in related(thing, EntityKind::Things, EntityKind::Locations) {
            let Some((geometry, kind)) = record_geometry(location, LOCATION, cx.crs) else {
                continue;
            };
            table.push_row([
                Value::String(geometry),
                id(thing),
                text(thing, "name"),
                text(thing, "description"),
                text(location, "name"),
                Value::String(kind),
            ]);
        }
    }

    table.into_frame(cx.query.frame_name("Things Locations"))
}

/// Locations, optionally joined with their expanded things.
pub(super) fn locations(cx: &Context) -> Frame {
    let with_things = cx.expanded.contains(&EntityKind::Things);
    let mut fields = vec![
        geojson(),
        Field::number("location_id").with_display_name("Location ID"),
        Field::string("location_name").with_display_name("Location Name"),
        Field::string("location_description").with_display_name("Location Description"),
        Field::string("location_type").with_display_name("Geometry Type"),
    ];
    if with_things {
        fields.extend([
            Field::number("thing_id").with_display_name("Thing ID"),
            Field::string("thing_name").with_display_name("Thing Name"),
            Field::string("thing_description").with_display_name("Thing Description"),
        ]);
    }
    let mut table = Table::new(fields);

    for location in cx.records {
        let Some((geometry, kind)) = record_geometry(location, LOCATION, cx.crs) else {
            continue;
        };
        let row = [
            Value::String(geometry),
            id(location),
            text(location, "name"),
            text(location, "description"),
            Value::String(kind),
        ];

        if !with_things {
            table.push_row(row);
            continue;
        }

        let things = related(location, EntityKind::Locations, EntityKind::Things);
        if things.is_empty() {
            table.push_row(row.into_iter().chain([Value::Null, Value::Null, Value::Null]));
        } else {
            for thing in things {
                table.push_row(row.iter().cloned().chain([
                    id(thing),
                    text(thing, "name"),
                    text(thing, "description"),
                ]));
            }
        }
    }

    table.into_frame(cx.query.frame_name(EntityKind::Locations.plural()))
}

pub(super) fn thing_historical_locations(cx: &Context) -> Frame {
    let mut table = Table::new([
        geojson(),
        Field::number("thing_id").with_display_name("Thing ID"),
        Field::string("thing_name").with_display_name("Thing Name"),
        Field::string("thing_description").with_display_name("Thing Description"),
        Field::string("historical_location_name").with_display_name("Location Name"),
        Field::string("location_type").with_display_name("Geometry Type"),
        Field::time("time").with_display_name("Time"),
    ]);

    for thing in cx.records {
        for hist in related(thing, EntityKind::Things, EntityKind::HistoricalLocations) {
            let Some((location, geometry, kind, time)) = historical_location(cx, hist) else {
                continue;
            };
            table.push_row([
                Value::String(geometry),
                id(thing),
                text(thing, "name"),
                text(thing, "description"),
                text(location, "name"),
                Value::String(kind),
                Value::from(time),
            ]);
        }
    }

    table.into_frame(cx.query.frame_name("Things Historical Locations"))
}

pub(super) fn historical_locations(cx: &Context) -> Frame {
    let mut table = Table::new([
        geojson(),
        Field::number("location_id").with_display_name("Location ID"),
        Field::string("location_type").with_display_name("Geometry Type"),
        Field::time("time").with_display_name("Time"),
    ]);

    for hist in cx.records {
        let Some((location, geometry, kind, time)) = historical_location(cx, hist) else {
            continue;
        };
        table.push_row([
            Value::String(geometry),
            id(location),
            Value::String(kind),
            Value::from(time),
        ]);
    }

    table.into_frame(cx.query.frame_name("Historical Locations"))
}

/// The first usable location of a historical location entry, with its
/// geometry and the entry's time.
fn historical_location<'a>(
    cx: &Context,
    hist: &'a Value,
) -> Option<(&'a Value, String, String, i64)> {
    let time = record_time(hist, "time")?;
    related(hist, EntityKind::HistoricalLocations, EntityKind::Locations)
        .into_iter()
        .find_map(|location| {
            let (geometry, kind) = record_geometry(location, LOCATION, cx.crs)?;
            Some((location, geometry, kind, time))
        })
}

pub(super) fn features(cx: &Context) -> Frame {
    let mut table = Table::new([
        geojson(),
        Field::number("feature_id").with_display_name("Feature ID"),
        Field::string("feature_name").with_display_name("Feature Name"),
        Field::string("feature_description").with_display_name("Feature Description"),
        Field::string("feature_type").with_display_name("Geometry Type"),
    ]);

    for feature in cx.records {
        let Some((geometry, kind)) = record_geometry(feature, FEATURE, cx.crs) else {
            continue;
        };
        table.push_row([
            Value::String(geometry),
            id(feature),
            text(feature, "name"),
            text(feature, "description"),
            Value::String(kind),
        ]);
    }

    table.into_frame(cx.query.frame_name("Features of Interest"))
}
