/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::{BTreeMap, BTreeSet};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    sequence::{delimited, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::{
    filter::{FilterCondition, FilterValue},
    query::Query,
};

/// Template variable values in scope for a request.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ScopedVars(BTreeMap<String, String>);

/// Substitution of template variable placeholders, as provided by the
/// dashboard host.
pub trait TemplateSrv {
    fn replace(&self, text: &str, scoped: &ScopedVars) -> String;
}

/// Placeholder substitution from a fixed set of variables. Scoped
/// variables take precedence. Supports `$name`, `${name}` and `[[name]]`;
/// unknown placeholders are left as they are.
#[derive(Clone, Default, Debug)]
pub struct Variables(BTreeMap<String, String>);

impl ScopedVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ScopedVars {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl TemplateSrv for Variables {
    fn replace(&self, text: &str, scoped: &ScopedVars) -> String {
        let lookup = |name: &str| {
            scoped
                .get(name)
                .or_else(|| self.0.get(name).map(String::as_str))
        };

        let mut out = String::with_capacity(text.len());
        let mut input = text;
        while let Some(pos) = input.find(|c| c == '$' || c == '[') {
            out.push_str(&input[..pos]);
            input = &input[pos..];
            match placeholder(input)
                .ok()
                .and_then(|(rest, name)| Some((rest, lookup(name)?)))
            {
                Some((rest, value)) => {
                    out.push_str(value);
                    input = rest;
                }
                None => {
                    // Both markers are ASCII.
                    out.push_str(&input[..1]);
                    input = &input[1..];
                }
            }
        }
        out.push_str(input);
        out
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn placeholder(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(tag("${"), take_while1(is_name_char), tag("}")),
        delimited(tag("[["), take_while1(is_name_char), tag("]]")),
        preceded(tag("$"), take_while1(is_name_char)),
    ))(input)
}

/// Substitute template variables into a query. Variable filters bound to
/// the query's own entity kind turn into the entity id when they resolve
/// to an integer.
pub fn apply_template_variables<T: TemplateSrv + ?Sized>(
    query: &Query,
    scoped: &ScopedVars,
    srv: &T,
) -> Query {
    let replace = |text: &str| srv.replace(text, scoped);
    let mut query = query.clone();

    query.alias = query.alias.as_deref().map(replace);
    query.expression = query.expression.as_deref().map(replace);

    let mut bound = BTreeSet::new();
    let mut entity_id = query.entity_id;
    let filters = std::mem::take(&mut query.filters);

    query.filters = filters
        .into_iter()
        .filter_map(|mut filter| {
            match &mut filter {
                FilterCondition::Basic(f)
                | FilterCondition::Measurement(f)
                | FilterCondition::Observation(f) => replace_value(&mut f.value, &replace),
                FilterCondition::Entity(f) => replace_value(&mut f.value, &replace),
                FilterCondition::Temporal(f) => {
                    replace_value(&mut f.value, &replace);
                    f.start_date = f.start_date.as_deref().map(replace);
                    f.end_date = f.end_date.as_deref().map(replace);
                }
                FilterCondition::Complex(f) => f.expression = replace(&f.expression),
                FilterCondition::Spatial(_) => {}
                FilterCondition::Variable(f) => {
                    if !bound.insert(f.entity) {
                        log::warn!(
                            "dropping duplicate variable filter {} for {}",
                            f.variable_name,
                            f.entity
                        );
                        return None;
                    }

                    let placeholder = format!("${}", f.variable_name);
                    let value = replace(&placeholder);
                    if value.is_empty() || value == placeholder {
                        log::debug!("variable {} is unresolved", f.variable_name);
                        f.value = None;
                        return Some(filter);
                    }

                    let id = value.trim().parse::<i64>().ok();
                    if let (true, Some(id)) = (f.entity == query.entity, id) {
                        log::debug!("applying variable {} as entity id {id}", f.variable_name);
                        entity_id = Some(id);
                        return None;
                    }

                    f.value = Some(match id {
                        Some(id) => FilterValue::from(id),
                        None => FilterValue::Text(value),
                    });
                }
            }
            Some(filter)
        })
        .collect();

    query.entity_id = entity_id;
    query
}

fn replace_value<F: Fn(&str) -> String>(value: &mut Option<FilterValue>, replace: &F) {
    if let Some(FilterValue::Text(text)) = value {
        *text = replace(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> Variables {
        [("thing", "42"), ("site", "Lugano")].into_iter().collect()
    }

    #[test]
    fn placeholder_forms() {
        let srv = vars();
        let scoped = ScopedVars::new();
        assert_eq!(srv.replace("$thing", &scoped), "42");
        assert_eq!(srv.replace("id-${thing}-x", &scoped), "id-42-x");
        assert_eq!(srv.replace("[[site]]!", &scoped), "Lugano!");
        assert_eq!(srv.replace("$unknown [x]", &scoped), "$unknown [x]");
    }

    #[test]
    fn scoped_vars_take_precedence() {
        let scoped = [("site", "Bellinzona")].into_iter().collect::<ScopedVars>();
        assert_eq!(vars().replace("$site", &scoped), "Bellinzona");
    }
}
