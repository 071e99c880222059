/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

//! Option sets offered by query editors. All lists are immutable and
//! depend only on the entity kind being queried.

use serde::Serialize;

use crate::{
    entity::EntityKind,
    filter::{GeometryKind, Operator, SpatialOperator},
    query::ResultFormat,
};

/// A selectable option with a human-readable label.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Choice<T> {
    pub label: &'static str,
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    Basic,
    Temporal,
    Measurement,
    Spatial,
    Observation,
    Entity,
    Variable,
    Complex,
}

const fn choice<T>(label: &'static str, value: T, description: &'static str) -> Choice<T> {
    Choice {
        label,
        value,
        description: Some(description),
    }
}

const COMMON_FIELDS: &[Choice<&str>] = &[
    choice("Name", "name", "Entity name"),
    choice("ID", "@iot.id", "Entity ID"),
    choice("Description", "description", "Entity description"),
];

const OBSERVATION_FIELDS: &[Choice<&str>] = &[
    choice("Name", "name", "Entity name"),
    choice("ID", "@iot.id", "Entity ID"),
    choice("Description", "description", "Entity description"),
    choice("Result", "result", "Observation result value"),
    choice("Phenomenon Time", "phenomenonTime", "Time of phenomenon"),
    choice("Result Time", "resultTime", "Time of result"),
    choice(
        "Feature of Interest",
        "FeatureOfInterest/@iot.id",
        "Feature of interest ID",
    ),
];

const MEASUREMENT_FIELDS: &[Choice<&str>] = &[
    choice("Unit Name", "unitOfMeasurement/name", "Unit of measurement name"),
    choice(
        "Unit Symbol",
        "unitOfMeasurement/symbol",
        "Unit of measurement symbol",
    ),
];

const TEMPORAL_FIELDS: &[Choice<&str>] = &[
    choice("Phenomenon Time", "phenomenonTime", "Time of phenomenon"),
    choice("Result Time", "resultTime", "Time of result"),
];

const SPATIAL_FIELDS: &[Choice<&str>] = &[
    choice("Observed Area", "observedArea", "Observed area"),
    choice("Location", "location", "Location"),
];

/// Everything a query editor offers for one entity kind.
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    pub entities: Vec<Choice<EntityKind>>,
    pub expand: Vec<Choice<EntityKind>>,
    pub filters: Vec<FilterOptions>,
    pub spatial_operators: &'static [SpatialOperator],
    pub geometry_kinds: &'static [GeometryKind],
    pub result_formats: &'static [ResultFormat],
}

#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct FilterOptions {
    pub kind: FilterKind,
    pub fields: &'static [Choice<&'static str>],
    pub operators: Vec<Operator>,
}

pub fn editor_options(kind: EntityKind) -> EditorOptions {
    EditorOptions {
        entities: entities(),
        expand: expand_targets(kind),
        filters: filter_kinds(kind)
            .into_iter()
            .map(|filter| FilterOptions {
                kind: filter,
                fields: filter_fields(kind, filter),
                operators: operators(filter),
            })
            .collect(),
        spatial_operators: spatial_operators(),
        geometry_kinds: geometry_kinds(),
        result_formats: result_formats(),
    }
}

pub fn entities() -> Vec<Choice<EntityKind>> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| Choice {
            label: entity_label(kind),
            value: kind,
            description: Some(entity_description(kind)),
        })
        .collect()
}

fn entity_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::ObservedProperties => "Observed Properties",
        EntityKind::FeaturesOfInterest => "Features of Interest",
        EntityKind::HistoricalLocations => "Historical Locations",
        _ => kind.plural(),
    }
}

fn entity_description(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Things => "Physical or virtual objects",
        EntityKind::Locations => "Geographic positions",
        EntityKind::Sensors => "Measurement instruments",
        EntityKind::ObservedProperties => "What is being measured",
        EntityKind::Datastreams => "Links Things, Sensors, and ObservedProperties",
        EntityKind::Observations => "Actual measurements",
        EntityKind::FeaturesOfInterest => "Real-world features being observed",
        EntityKind::HistoricalLocations => "Movement history of Things",
    }
}

/// Relations that can be expanded on `kind`, labelled with the
/// navigation property name.
pub fn expand_targets(kind: EntityKind) -> Vec<Choice<EntityKind>> {
    kind.relations()
        .iter()
        .map(|rel| Choice {
            label: rel.name(),
            value: rel.target,
            description: None,
        })
        .collect()
}

/// Filter kinds that make sense for `kind`.
pub fn filter_kinds(kind: EntityKind) -> Vec<FilterKind> {
    let mut kinds = vec![FilterKind::Basic, FilterKind::Temporal, FilterKind::Measurement];
    if matches!(
        kind,
        EntityKind::Locations | EntityKind::FeaturesOfInterest | EntityKind::Datastreams
    ) {
        kinds.push(FilterKind::Spatial);
    }
    if kind == EntityKind::Datastreams {
        kinds.push(FilterKind::Observation);
    }
    if !kind.relations().is_empty() {
        kinds.push(FilterKind::Entity);
    }
    kinds.extend([FilterKind::Variable, FilterKind::Complex]);
    kinds
}

/// Fields offered for a filter of the given kind.
pub fn filter_fields(kind: EntityKind, filter: FilterKind) -> &'static [Choice<&'static str>] {
    match filter {
        FilterKind::Basic | FilterKind::Entity | FilterKind::Variable => {
            if kind == EntityKind::Observations {
                OBSERVATION_FIELDS
            } else {
                COMMON_FIELDS
            }
        }
        FilterKind::Observation => OBSERVATION_FIELDS,
        FilterKind::Measurement => MEASUREMENT_FIELDS,
        FilterKind::Temporal => TEMPORAL_FIELDS,
        FilterKind::Spatial => SPATIAL_FIELDS,
        FilterKind::Complex => &[],
    }
}

/// Operators allowed for a filter of the given kind.
pub fn operators(filter: FilterKind) -> Vec<Operator> {
    const COMPARISONS: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
    ];
    const STRING_FUNCTIONS: [Operator; 3] = [
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::SubstringOf,
    ];
    const DATE_PARTS: [Operator; 6] = [
        Operator::Year,
        Operator::Month,
        Operator::Day,
        Operator::Hour,
        Operator::Minute,
        Operator::Second,
    ];

    match filter {
        FilterKind::Basic | FilterKind::Entity => {
            COMPARISONS.into_iter().chain(STRING_FUNCTIONS).collect()
        }
        FilterKind::Temporal => COMPARISONS.into_iter().chain(DATE_PARTS).collect(),
        FilterKind::Measurement | FilterKind::Observation | FilterKind::Variable => {
            COMPARISONS.to_vec()
        }
        FilterKind::Spatial | FilterKind::Complex => Vec::new(),
    }
}

pub fn spatial_operators() -> &'static [SpatialOperator] {
    &[
        SpatialOperator::StWithin,
        SpatialOperator::StIntersects,
        SpatialOperator::StDistance,
        SpatialOperator::StContains,
        SpatialOperator::StCrosses,
        SpatialOperator::StDisjoint,
        SpatialOperator::StEquals,
        SpatialOperator::StOverlaps,
        SpatialOperator::StTouches,
    ]
}

pub fn geometry_kinds() -> &'static [GeometryKind] {
    &[GeometryKind::Point, GeometryKind::Polygon, GeometryKind::LineString]
}

pub fn result_formats() -> &'static [ResultFormat] {
    &[ResultFormat::Default, ResultFormat::DataArray]
}
