/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use itertools::Itertools;

use super::{
    parse_number, Comparison, ComplexFilter, EntityFilter, FilterCondition, FilterValue, Operator,
    SpatialFilter, SpatialOperator, TemporalFilter, VariableFilter,
};
use crate::{Error, Result};

const TIME_FIELDS: [&str; 2] = ["phenomenonTime", "resultTime"];

/// Compile a list of filter conditions into a single `$filter`
/// expression. Incomplete or malformed conditions are left out.
pub fn compile<'a, I>(filters: I) -> String
where
    I: IntoIterator<Item = &'a FilterCondition>,
{
    filters
        .into_iter()
        .filter_map(FilterCondition::compile)
        .join(" and ")
}

impl FilterCondition {
    /// Compile a single condition. Returns `None` if the condition is
    /// incomplete or invalid; invalid conditions are logged.
    pub fn compile(&self) -> Option<String> {
        match self.try_compile() {
            Ok(expr) => expr,
            Err(e) => {
                log::warn!("ignoring filter {}: {e}", self.id());
                None
            }
        }
    }

    fn try_compile(&self) -> Result<Option<String>> {
        match self {
            FilterCondition::Basic(f) => f.compile_basic(),
            FilterCondition::Temporal(f) => f.compile(),
            FilterCondition::Measurement(f) => f.compile_measurement(),
            FilterCondition::Spatial(f) => f.compile(),
            FilterCondition::Observation(f) => f.compile_observation(),
            FilterCondition::Entity(f) => f.compile(),
            FilterCondition::Variable(f) => Ok(f.compile()),
            FilterCondition::Complex(f) => Ok(f.compile()),
        }
    }
}

impl Comparison {
    fn parts(&self) -> Option<(Operator, &FilterValue)> {
        Some((self.operator?, self.value.as_ref()?))
    }

    fn compile_basic(&self) -> Result<Option<String>> {
        let Some((op, value)) = self.parts() else {
            return Ok(None);
        };
        if op.is_date_part() {
            return Err(Error::InvalidFilter("date-part operator on a basic filter"));
        }
        Ok(Some(comparison(&self.field, op, value, literal(value))))
    }

    fn compile_measurement(&self) -> Result<Option<String>> {
        let Some((op, value)) = self.parts() else {
            return Ok(None);
        };
        if !op.is_comparison() {
            return Err(Error::InvalidFilter(
                "measurement filters only support comparisons",
            ));
        }
        Ok(Some(format!(
            "{} {op} {}",
            self.field,
            numeric_literal(value)
        )))
    }

    fn compile_observation(&self) -> Result<Option<String>> {
        let Some((op, value)) = self.parts() else {
            return Ok(None);
        };
        if !op.is_comparison() {
            return Err(Error::InvalidFilter(
                "observation filters only support comparisons",
            ));
        }
        let value = if TIME_FIELDS.contains(&self.field.as_str()) {
            quoted(&value.to_string())
        } else {
            numeric_literal(value)
        };
        Ok(Some(format!("{} {op} {value}", self.field)))
    }
}

impl TemporalFilter {
    fn compile(&self) -> Result<Option<String>> {
        match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (Some(start), Some(end)) => {
                return Ok(Some(format!(
                    "{field} ge {} and {field} le {}",
                    quoted(start),
                    quoted(end),
                    field = self.field
                )))
            }
            (Some(_), None) | (None, Some(_)) => {
                log::debug!("temporal filter {} has an open range", self.id)
            }
            (None, None) => {}
        }

        let (Some(op), Some(value)) = (self.operator, self.value.as_ref()) else {
            return Ok(None);
        };
        if op.is_date_part() {
            Ok(Some(format!("{op}({}) eq {}", self.field, numeric_literal(value))))
        } else if op.is_comparison() {
            Ok(Some(format!("{} {op} {}", self.field, literal(value))))
        } else {
            Err(Error::InvalidFilter("string operator on a temporal filter"))
        }
    }
}

impl SpatialFilter {
    fn compile(&self) -> Result<Option<String>> {
        let Some(op) = self.operator else {
            return Ok(None);
        };
        let Some(geometry) = self.geometry()? else {
            return Ok(None);
        };
        let call = format!("{op}({}, {})", self.field, geometry.to_wkt());
        match (op, self.value.as_ref().and_then(FilterValue::as_f64)) {
            (SpatialOperator::StDistance, Some(distance)) => Ok(Some(format!("{call} le {distance}"))),
            _ => Ok(Some(call)),
        }
    }
}

impl EntityFilter {
    fn compile(&self) -> Result<Option<String>> {
        let (Some(entity), Some(op), Some(value)) = (self.entity, self.operator, self.value.as_ref())
        else {
            return Ok(None);
        };
        if value.is_empty() {
            return Ok(None);
        }
        if op.is_date_part() {
            return Err(Error::InvalidFilter("date-part operator on an entity filter"));
        }
        let path = format!("{}/{}", entity.singular(), self.field);
        Ok(Some(comparison(&path, op, value, literal(value))))
    }
}

impl VariableFilter {
    fn compile(&self) -> Option<String> {
        let path = format!("{}/{}", self.entity.singular(), self.field);
        match &self.value {
            Some(value) if !value.is_empty() => {
                Some(format!("{path} {} {}", self.operator, literal(value)))
            }
            _ if !self.variable_name.is_empty() => {
                Some(format!("{path} {} ${}", self.operator, self.variable_name))
            }
            _ => None,
        }
    }
}

impl ComplexFilter {
    fn compile(&self) -> Option<String> {
        let expr = self.expression.trim();
        (!expr.is_empty()).then(|| expr.to_string())
    }
}

/// Comparison or string function call. String functions take the raw
/// text of the value.
fn comparison(field: &str, op: Operator, value: &FilterValue, literal: String) -> String {
    match op {
        Operator::StartsWith | Operator::EndsWith => {
            format!("{op}({field},{})", quoted(&value.to_string()))
        }
        Operator::SubstringOf => format!("substringof({},{field})", quoted(&value.to_string())),
        _ => format!("{field} {op} {literal}"),
    }
}

fn literal(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(s) => quoted(s),
        _ => value.to_string(),
    }
}

/// Like `literal`, but strings that hold a number are emitted bare.
fn numeric_literal(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(s) if parse_number(s).is_some() => s.trim().to_string(),
        _ => literal(value),
    }
}

fn quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quoted("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(numeric_literal(&FilterValue::from("10")), "10");
        assert_eq!(numeric_literal(&FilterValue::from("ten")), "'ten'");
        assert_eq!(numeric_literal(&FilterValue::from(2.5)), "2.5");
    }
}
