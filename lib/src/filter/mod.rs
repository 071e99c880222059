/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod compile;
mod geometry;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

pub use compile::compile;
pub use geometry::Geometry;

/// A structured filter condition, as produced by the query editor.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterCondition {
    Basic(Comparison),
    Temporal(TemporalFilter),
    Measurement(Comparison),
    Spatial(SpatialFilter),
    /// Comparison on an Observation property. On Datastreams queries
    /// these are moved into the Observations expansion.
    Observation(Comparison),
    Entity(EntityFilter),
    Variable(VariableFilter),
    Complex(ComplexFilter),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    #[serde(default)]
    pub id: String,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TemporalFilter {
    #[serde(default)]
    pub id: String,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct SpatialFilter {
    #[serde(default)]
    pub id: String,
    #[serde(default = "SpatialFilter::default_field")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<SpatialOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_type: Option<GeometryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rings: Vec<Ring>,
    /// Distance bound for `st_distance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum Coordinates {
    Position(Vec<f64>),
    Positions(Vec<Vec<f64>>),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Ring {
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

/// A filter bound to a dashboard template variable.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct VariableFilter {
    #[serde(default)]
    pub id: String,
    pub entity: EntityKind,
    pub variable_name: String,
    #[serde(default = "VariableFilter::default_field")]
    pub field: String,
    #[serde(default = "VariableFilter::default_operator")]
    pub operator: Operator,
    /// Resolved value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ComplexFilter {
    #[serde(default)]
    pub id: String,
    pub expression: String,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    StartsWith,
    EndsWith,
    SubstringOf,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum SpatialOperator {
    StWithin,
    StIntersects,
    StDistance,
    StContains,
    StCrosses,
    StDisjoint,
    StEquals,
    StOverlaps,
    StTouches,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FilterCondition {
    pub fn basic<F: Into<String>, V: Into<FilterValue>>(field: F, operator: Operator, value: V) -> Self {
        Self::Basic(Comparison::new(field, operator, value))
    }

    pub fn measurement<F: Into<String>, V: Into<FilterValue>>(
        field: F,
        operator: Operator,
        value: V,
    ) -> Self {
        Self::Measurement(Comparison::new(field, operator, value))
    }

    pub fn observation<F: Into<String>, V: Into<FilterValue>>(
        field: F,
        operator: Operator,
        value: V,
    ) -> Self {
        Self::Observation(Comparison::new(field, operator, value))
    }

    pub fn temporal<F: Into<String>, V: Into<FilterValue>>(
        field: F,
        operator: Operator,
        value: V,
    ) -> Self {
        Self::Temporal(TemporalFilter {
            id: new_id(),
            field: field.into(),
            operator: Some(operator),
            value: Some(value.into()),
            start_date: None,
            end_date: None,
        })
    }

    pub fn time_range<F, S, E>(field: F, start: S, end: E) -> Self
    where
        F: Into<String>,
        S: Into<String>,
        E: Into<String>,
    {
        Self::Temporal(TemporalFilter {
            id: new_id(),
            field: field.into(),
            operator: None,
            value: None,
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        })
    }

    pub fn spatial(operator: SpatialOperator, geometry: &Geometry) -> Self {
        let (geometry_type, coordinates, rings) = geometry.to_parts();
        Self::Spatial(SpatialFilter {
            id: new_id(),
            field: SpatialFilter::default_field(),
            operator: Some(operator),
            geometry_type: Some(geometry_type),
            coordinates,
            rings,
            value: None,
        })
    }

    pub fn entity<F: Into<String>, V: Into<FilterValue>>(
        entity: EntityKind,
        field: F,
        operator: Operator,
        value: V,
    ) -> Self {
        Self::Entity(EntityFilter {
            id: new_id(),
            entity: Some(entity),
            field: field.into(),
            operator: Some(operator),
            value: Some(value.into()),
        })
    }

    pub fn variable<N: Into<String>>(entity: EntityKind, variable_name: N) -> Self {
        Self::Variable(VariableFilter {
            id: new_id(),
            entity,
            variable_name: variable_name.into(),
            field: VariableFilter::default_field(),
            operator: VariableFilter::default_operator(),
            value: None,
        })
    }

    pub fn complex<E: Into<String>>(expression: E) -> Self {
        Self::Complex(ComplexFilter {
            id: new_id(),
            expression: expression.into(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            FilterCondition::Basic(f)
            | FilterCondition::Measurement(f)
            | FilterCondition::Observation(f) => &f.id,
            FilterCondition::Temporal(f) => &f.id,
            FilterCondition::Spatial(f) => &f.id,
            FilterCondition::Entity(f) => &f.id,
            FilterCondition::Variable(f) => &f.id,
            FilterCondition::Complex(f) => &f.id,
        }
    }

    pub fn is_observation(&self) -> bool {
        matches!(self, FilterCondition::Observation(_))
    }

    /// Returns the bound variable filter if this is one.
    pub fn as_variable(&self) -> Option<&VariableFilter> {
        match self {
            FilterCondition::Variable(f) => Some(f),
            _ => None,
        }
    }
}

impl Comparison {
    pub fn new<F: Into<String>, V: Into<FilterValue>>(field: F, operator: Operator, value: V) -> Self {
        Self {
            id: new_id(),
            field: field.into(),
            operator: Some(operator),
            value: Some(value.into()),
        }
    }
}

impl SpatialFilter {
    fn default_field() -> String {
        "observedArea".to_string()
    }
}

impl VariableFilter {
    fn default_field() -> String {
        "@iot.id".to_string()
    }

    fn default_operator() -> Operator {
        Operator::Eq
    }
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
            Operator::SubstringOf => "substringof",
            Operator::Year => "year",
            Operator::Month => "month",
            Operator::Day => "day",
            Operator::Hour => "hour",
            Operator::Minute => "minute",
            Operator::Second => "second",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }

    pub fn is_string_function(self) -> bool {
        matches!(
            self,
            Operator::StartsWith | Operator::EndsWith | Operator::SubstringOf
        )
    }

    pub fn is_date_part(self) -> bool {
        matches!(
            self,
            Operator::Year
                | Operator::Month
                | Operator::Day
                | Operator::Hour
                | Operator::Minute
                | Operator::Second
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SpatialOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SpatialOperator::StWithin => "st_within",
            SpatialOperator::StIntersects => "st_intersects",
            SpatialOperator::StDistance => "st_distance",
            SpatialOperator::StContains => "st_contains",
            SpatialOperator::StCrosses => "st_crosses",
            SpatialOperator::StDisjoint => "st_disjoint",
            SpatialOperator::StEquals => "st_equals",
            SpatialOperator::StOverlaps => "st_overlaps",
            SpatialOperator::StTouches => "st_touches",
        }
    }
}

impl Display for SpatialOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterValue::Text(s) if s.is_empty())
    }

    /// Numeric value, if this is a number or a string holding one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => n.as_f64(),
            FilterValue::Text(s) => parse_number(s),
            FilterValue::Bool(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Number(n) => write!(f, "{n}"),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map_or_else(|| FilterValue::Text(value.to_string()), FilterValue::Number)
    }
}

/// Parse a plain decimal number; rejects `inf`, `NaN` and the like.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty()
        || !s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    s.parse().ok()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
