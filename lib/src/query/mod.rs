/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod expand;
mod url;

use std::{collections::BTreeSet, fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    entity::EntityKind,
    filter::{self, FilterCondition},
    Error, Result,
};

pub use expand::scan_expanded;
pub use url::{build_url, Encoding};

/// A dashboard panel query against a SensorThings API service.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    pub entity: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<ExpandDirective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orderby: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default)]
    pub count: bool,
    #[serde(default)]
    pub result_format: ResultFormat,
    /// Free-form query string, bypassing the structured fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_to: Option<FromTo>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExpandDirective {
    pub entity: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_query: Option<SubQuery>,
}

/// Query options applied to an expanded relation.
#[derive(Serialize, Deserialize, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct SubQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orderby: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct OrderBy {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum ResultFormat {
    #[default]
    Default,
    DataArray,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct FromTo {
    pub from: String,
    pub to: String,
}

impl Query {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            ref_id: None,
            entity,
            entity_id: None,
            filters: Vec::new(),
            expand: Vec::new(),
            select: Vec::new(),
            orderby: Vec::new(),
            top: None,
            skip: None,
            count: false,
            result_format: ResultFormat::Default,
            expression: None,
            alias: None,
            as_of: None,
            from_to: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| Error::ReadQuery(path.to_path_buf(), e))?;
        serde_json::from_str(&data).map_err(|e| Error::DecodeQuery(path.to_path_buf(), e))
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn with_filter(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_expand(mut self, entity: EntityKind, sub_query: Option<SubQuery>) -> Self {
        self.expand.push(ExpandDirective { entity, sub_query });
        self
    }

    pub fn with_select<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_order_by<P: Into<String>>(mut self, property: P, direction: Direction) -> Self {
        self.orderby.push(OrderBy {
            property: property.into(),
            direction,
        });
        self
    }

    pub fn with_top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    pub fn with_result_format(mut self, format: ResultFormat) -> Self {
        self.result_format = format;
        self
    }

    pub fn with_expression<E: Into<String>>(mut self, expression: E) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_alias<A: Into<String>>(mut self, alias: A) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_as_of<T: Into<String>>(mut self, timestamp: T) -> Self {
        self.as_of = Some(timestamp.into());
        self
    }

    pub fn with_from_to<F: Into<String>, T: Into<String>>(mut self, from: F, to: T) -> Self {
        self.from_to = Some(FromTo {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn with_ref_id<R: Into<String>>(mut self, ref_id: R) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    /// The free-form expression, if a non-blank one was given.
    pub fn free_form(&self) -> Option<&str> {
        self.expression
            .as_deref()
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
    }

    /// Observation filters are pushed into the Observations expansion of
    /// Datastreams queries.
    fn scopes_observations(&self) -> bool {
        self.entity == EntityKind::Datastreams
    }

    /// Filters that go into the top-level `$filter` parameter.
    pub fn top_level_filters(&self) -> impl Iterator<Item = &FilterCondition> {
        self.filters.iter().filter(move |f| match f {
            FilterCondition::Observation(_) => !self.scopes_observations(),
            FilterCondition::Variable(v) => v.entity != self.entity,
            _ => true,
        })
    }

    /// The compiled top-level filter expression (empty if none).
    pub fn filter_expression(&self) -> String {
        filter::compile(self.top_level_filters())
    }

    /// The expand list as sent to the server. Observation filters of
    /// Datastreams queries become the filter of the Observations
    /// expansion; without them, that filter is dropped again.
    pub fn effective_expand(&self) -> Vec<ExpandDirective> {
        let mut expand = self.expand.clone();
        if !self.scopes_observations() {
            return expand;
        }

        let observation_filter =
            filter::compile(self.filters.iter().filter(|f| f.is_observation()));
        let pos = expand
            .iter()
            .position(|exp| exp.entity == EntityKind::Observations);

        if observation_filter.is_empty() {
            if let Some(exp) = pos.map(|i| &mut expand[i]) {
                if let Some(sub) = &mut exp.sub_query {
                    sub.filter = None;
                    if sub.is_empty() {
                        exp.sub_query = None;
                    }
                }
            }
        } else {
            log::debug!("applying observation filter to expansion: {observation_filter}");
            let exp = match pos {
                Some(i) => &mut expand[i],
                None => {
                    expand.push(ExpandDirective {
                        entity: EntityKind::Observations,
                        sub_query: None,
                    });
                    let last = expand.len() - 1;
                    &mut expand[last]
                }
            };
            exp.sub_query.get_or_insert_with(SubQuery::default).filter = Some(observation_filter);
        }

        expand
    }

    /// Relations expanded by this query, taken from the structured expand
    /// list or scanned from the free-form expression.
    pub fn expanded(&self) -> BTreeSet<EntityKind> {
        match self.free_form() {
            Some(expr) => scan_expanded(expr),
            None => self.effective_expand().into_iter().map(|exp| exp.entity).collect(),
        }
    }

    /// Frame name: the alias if set, else the given default.
    pub fn frame_name<D: Into<String>>(&self, default: D) -> String {
        self.alias
            .as_ref()
            .filter(|alias| !alias.is_empty())
            .cloned()
            .unwrap_or_else(|| default.into())
    }
}

impl SubQuery {
    pub fn is_empty(&self) -> bool {
        self.filter.is_none()
            && self.select.is_empty()
            && self.orderby.is_empty()
            && self.top.is_none()
            && self.skip.is_none()
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.property, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;

    #[test]
    fn effective_expand_does_not_mutate() {
        let query = Query::new(EntityKind::Datastreams).with_filter(FilterCondition::observation(
            "result",
            Operator::Gt,
            "10",
        ));
        let expand = query.effective_expand();
        assert!(query.expand.is_empty());
        assert_eq!(expand.len(), 1);
        assert_eq!(
            expand[0].sub_query.as_ref().and_then(|s| s.filter.as_deref()),
            Some("result gt 10")
        );
    }

    #[test]
    fn stale_observation_filter_is_stripped() {
        let query = Query::new(EntityKind::Datastreams).with_expand(
            EntityKind::Observations,
            Some(SubQuery {
                filter: Some("result gt 10".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(query.effective_expand()[0].sub_query, None);

        let query = Query::new(EntityKind::Datastreams).with_expand(
            EntityKind::Observations,
            Some(SubQuery {
                filter: Some("result gt 10".to_string()),
                top: Some(5),
                ..Default::default()
            }),
        );
        assert_eq!(
            query.effective_expand()[0].sub_query,
            Some(SubQuery {
                top: Some(5),
                ..Default::default()
            })
        );
    }

    #[test]
    fn alias_wins_over_default_name() {
        let query = Query::new(EntityKind::Things);
        assert_eq!(query.frame_name("Things"), "Things");
        assert_eq!(query.with_alias("Mine").frame_name("Things"), "Mine");
    }
}
