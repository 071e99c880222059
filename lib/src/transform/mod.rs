/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod datastreams;
mod generic;
mod locations;
mod observations;

use std::collections::BTreeSet;

use serde_json::Value;

use crate::{
    crs::Crs,
    entity::EntityKind,
    frame::{Field, Frame},
    query::Query,
    response::{self, ID},
    Error, Result,
};

pub use generic::raw_frame;

/// Frame layouts produced by the transformer.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Layout {
    Generic,
    DatastreamSeries,
    EntityDatastreams,
    ThingLocations,
    LocationGeometry,
    ThingHistoricalLocations,
    HistoricalLocationGeometry,
    ObservationDatastream,
    FeatureSeries,
    FeatureGeometry,
    Observations,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Arity {
    Single,
    Any,
}

struct Rule {
    entity: EntityKind,
    expanded: Option<EntityKind>,
    arity: Arity,
    layout: Layout,
}

const fn rule(
    entity: EntityKind,
    expanded: Option<EntityKind>,
    arity: Arity,
    layout: Layout,
) -> Rule {
    Rule {
        entity,
        expanded,
        arity,
        layout,
    }
}

/// Ordered decision table; the first matching rule wins.
const RULES: &[Rule] = {
    use Arity::*;
    use EntityKind::*;
    &[
        rule(Datastreams, Some(Observations), Any, Layout::DatastreamSeries),
        rule(Things, Some(Datastreams), Any, Layout::EntityDatastreams),
        rule(Things, Some(Locations), Any, Layout::ThingLocations),
        rule(Things, Some(HistoricalLocations), Any, Layout::ThingHistoricalLocations),
        rule(Sensors, Some(Datastreams), Any, Layout::EntityDatastreams),
        rule(ObservedProperties, Some(Datastreams), Any, Layout::EntityDatastreams),
        rule(Locations, None, Any, Layout::LocationGeometry),
        rule(HistoricalLocations, Some(Locations), Any, Layout::HistoricalLocationGeometry),
        rule(Observations, Some(Datastreams), Any, Layout::ObservationDatastream),
        rule(FeaturesOfInterest, Some(Observations), Single, Layout::FeatureSeries),
        rule(FeaturesOfInterest, None, Any, Layout::FeatureGeometry),
        rule(Observations, None, Any, Layout::Observations),
    ]
};

impl Layout {
    pub fn select(entity: EntityKind, expanded: &BTreeSet<EntityKind>, single: bool) -> Self {
        RULES
            .iter()
            .find(|rule| {
                rule.entity == entity
                    && rule.expanded.map_or(true, |rel| expanded.contains(&rel))
                    && (rule.arity == Arity::Any || single)
            })
            .map_or(Layout::Generic, |rule| rule.layout)
    }

    pub fn is_geospatial(self) -> bool {
        matches!(
            self,
            Layout::ThingLocations
                | Layout::LocationGeometry
                | Layout::ThingHistoricalLocations
                | Layout::HistoricalLocationGeometry
                | Layout::FeatureGeometry
        )
    }
}

/// Context shared by the layout builders.
pub(crate) struct Context<'a> {
    pub query: &'a Query,
    pub payload: &'a Value,
    pub records: &'a [Value],
    pub expanded: BTreeSet<EntityKind>,
    pub crs: Crs,
}

/// Turn a response payload into frames. Never fails: malformed records
/// are skipped with a warning.
pub fn transform(payload: &Value, query: &Query, crs: Crs) -> Vec<Frame> {
    let expanded = query.expanded();
    let single = payload.is_object() && !response::is_collection(payload);
    let layout = Layout::select(query.entity, &expanded, single);
    log::debug!(
        "transforming {} response ({} expanded) as {layout:?}",
        query.entity,
        expanded.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
    );

    let cx = Context {
        query,
        payload,
        records: response::records(payload),
        expanded,
        crs,
    };

    let frames = match layout {
        Layout::Generic => vec![generic::table(&cx)],
        Layout::DatastreamSeries => datastreams::series(&cx),
        Layout::EntityDatastreams => vec![datastreams::entity_datastreams(&cx)],
        Layout::ObservationDatastream => vec![datastreams::observation_datastreams(&cx)],
        Layout::ThingLocations => vec![locations::thing_locations(&cx)],
        Layout::LocationGeometry => vec![locations::locations(&cx)],
        Layout::ThingHistoricalLocations => vec![locations::thing_historical_locations(&cx)],
        Layout::HistoricalLocationGeometry => vec![locations::historical_locations(&cx)],
        Layout::FeatureGeometry => vec![locations::features(&cx)],
        Layout::FeatureSeries => vec![observations::feature_series(&cx)],
        Layout::Observations => vec![observations::observations(&cx)],
    };

    frames
        .into_iter()
        .map(|frame| {
            let frame = frame.with_ref_id(query.ref_id.clone());
            match layout.is_geospatial() {
                true => frame.geospatial(),
                false => frame,
            }
        })
        .collect()
}

/// Row-wise builder for frames with a fixed set of columns.
pub(crate) struct Table {
    fields: Vec<Field>,
}

impl Table {
    pub fn new<I: IntoIterator<Item = Field>>(fields: I) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn push_row<I: IntoIterator<Item = Value>>(&mut self, row: I) {
        self.fields
            .iter_mut()
            .zip(row)
            .for_each(|(field, value)| field.values.push(value));
    }

    pub fn into_frame<N: Into<String>>(self, name: N) -> Frame {
        self.fields.into_iter().fold(Frame::new(name), Frame::with_field)
    }
}

/// Related entities of `record` expanded under the navigation property
/// for `target`. To-one relations yield at most one entity.
pub(crate) fn related(record: &Value, parent: EntityKind, target: EntityKind) -> Vec<&Value> {
    let names = [
        parent.navigation_name(target),
        target.plural(),
        target.singular(),
    ];
    match names.into_iter().find_map(|name| record.get(name)) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}

pub(crate) fn id(record: &Value) -> Value {
    record.get(ID).cloned().unwrap_or(Value::Null)
}

/// A string property, or the empty string.
pub(crate) fn text(record: &Value, key: &str) -> Value {
    Value::String(
        record
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    )
}

pub(crate) fn str_prop<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Parse an ISO 8601 instant, or the start of an interval, to epoch
/// milliseconds.
pub fn parse_time(value: &str) -> Result<i64> {
    let start = value.split('/').next().unwrap_or(value).trim();
    chrono::DateTime::parse_from_rfc3339(start)
        .map(|t| t.timestamp_millis())
        .map_err(|e| Error::InvalidTime(value.to_string(), e))
}

pub(crate) fn time_of(record: &Value, key: &str) -> Result<i64> {
    str_prop(record, key)
        .ok_or(Error::MissingTime)
        .and_then(parse_time)
}

/// The record's time, if present. Malformed times drop the record.
pub(crate) fn record_time(record: &Value, key: &str) -> Option<i64> {
    match time_of(record, key) {
        Ok(t) => Some(t),
        Err(Error::MissingTime) => None,
        Err(e) => {
            log::warn!("skipping record {}: {e}", id(record));
            None
        }
    }
}

pub(crate) fn record_geometry(record: &Value, key: &str, crs: Crs) -> Option<(String, String)> {
    geometry(record, key, crs)
        .map_err(|e| log::warn!("skipping record {}: {e}", id(record)))
        .ok()
}

/// Reproject the geometry stored under `key` (a GeoJSON geometry or
/// feature), returning the serialized geometry and its type.
pub(crate) fn geometry(record: &Value, key: &str, crs: Crs) -> Result<(String, String)> {
    let geom = record
        .get(key)
        .ok_or(Error::InvalidGeometry("missing geometry"))?;
    let geom = match geom.get("type").and_then(Value::as_str) {
        Some("Feature") => geom
            .get("geometry")
            .ok_or(Error::InvalidGeometry("feature without geometry"))?,
        _ => geom,
    };
    let projected = crs.reproject(geom)?;
    let kind = projected
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok((projected.to_string(), kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn things_priority() {
        let expanded = BTreeSet::from([
            EntityKind::Locations,
            EntityKind::Datastreams,
            EntityKind::HistoricalLocations,
        ]);
        assert_eq!(
            Layout::select(EntityKind::Things, &expanded, false),
            Layout::EntityDatastreams
        );
        let expanded = BTreeSet::from([EntityKind::Locations, EntityKind::HistoricalLocations]);
        assert_eq!(
            Layout::select(EntityKind::Things, &expanded, false),
            Layout::ThingLocations
        );
    }

    #[test]
    fn feature_series_needs_single_entity() {
        let expanded = BTreeSet::from([EntityKind::Observations]);
        assert_eq!(
            Layout::select(EntityKind::FeaturesOfInterest, &expanded, true),
            Layout::FeatureSeries
        );
        assert_eq!(
            Layout::select(EntityKind::FeaturesOfInterest, &expanded, false),
            Layout::FeatureGeometry
        );
    }

    #[test]
    fn unexpanded_entities_are_generic() {
        let none = BTreeSet::new();
        assert_eq!(Layout::select(EntityKind::Sensors, &none, false), Layout::Generic);
        assert_eq!(Layout::select(EntityKind::Datastreams, &none, true), Layout::Generic);
        assert_eq!(
            Layout::select(EntityKind::HistoricalLocations, &none, false),
            Layout::Generic
        );
    }

    #[test]
    fn interval_start() {
        assert_eq!(
            parse_time("1970-01-01T00:00:01Z/1970-01-01T00:00:02Z").unwrap(),
            1000
        );
        assert!(parse_time("yesterday").is_err());
    }
}
