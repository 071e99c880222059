/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::borrow::Cow;

use itertools::Itertools;

use super::{ExpandDirective, OrderBy, Query, ResultFormat, SubQuery};
use crate::entity::EntityKind;

/// Whether user-supplied parts of the query string are percent-encoded.
/// The unencoded form is only meant for display.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Encoding {
    #[default]
    Encoded,
    Unencoded,
}

impl Encoding {
    fn apply<'a>(self, s: &'a str) -> Cow<'a, str> {
        match self {
            Encoding::Encoded => urlencoding::encode(s),
            Encoding::Unencoded => Cow::Borrowed(s),
        }
    }
}

/// Build the request URL for `query` relative to the service root.
pub fn build_url(base: &str, query: &Query) -> String {
    query.url(base, Encoding::Encoded)
}

impl Query {
    /// Resource path: `Entity` or `Entity(id)`.
    pub fn path(&self) -> String {
        match self.entity_id {
            Some(id) => format!("{}({id})", self.entity),
            None => self.entity.to_string(),
        }
    }

    pub fn url(&self, base: &str, encoding: Encoding) -> String {
        let url = format!(
            "{}/{}{}",
            base.trim_end_matches('/'),
            self.path(),
            self.query_string(encoding)
        );
        log::debug!("compiled query url: {url}");
        url
    }

    /// The query string including the leading `?`, or an empty string
    /// if there are no parameters.
    pub fn query_string(&self, encoding: Encoding) -> String {
        if let Some(expr) = self.free_form() {
            let expr = expr.trim_start_matches('?');
            return match expr.is_empty() {
                true => String::new(),
                false => format!("?{expr}"),
            };
        }

        let params = self.params(encoding);
        match params.is_empty() {
            true => String::new(),
            false => format!("?{}", params.join("&")),
        }
    }

    fn params(&self, encoding: Encoding) -> Vec<String> {
        let mut params = Vec::new();

        let filter = self.filter_expression();
        if !filter.is_empty() {
            params.push(format!("$filter={}", encoding.apply(&filter)));
        }

        let expand = self.effective_expand();
        if !expand.is_empty() {
            params.push(format!(
                "$expand={}",
                expand
                    .iter()
                    .map(|exp| expand_item(self.entity, exp, encoding))
                    .join(",")
            ));
        }

        if !self.select.is_empty() {
            params.push(format!("$select={}", select(&self.select, encoding)));
        }
        if !self.orderby.is_empty() {
            params.push(format!("$orderby={}", order_by(&self.orderby, encoding)));
        }
        if let Some(top) = self.top {
            params.push(format!("$top={top}"));
        }
        if let Some(skip) = self.skip {
            params.push(format!("$skip={skip}"));
        }
        if self.count {
            params.push("$count=true".to_string());
        }
        if self.result_format == ResultFormat::DataArray {
            params.push("$resultFormat=dataArray".to_string());
        }
        if let Some(as_of) = &self.as_of {
            params.push(format!("asOf={}", encoding.apply(as_of)));
        }
        if let Some(range) = &self.from_to {
            params.push(format!("from={}", encoding.apply(&range.from)));
            params.push(format!("to={}", encoding.apply(&range.to)));
        }

        params
    }
}

fn expand_item(parent: EntityKind, exp: &ExpandDirective, encoding: Encoding) -> String {
    let mut params = Vec::new();
    // Locations of historical locations are not returned unless expanded.
    if exp.entity == EntityKind::HistoricalLocations {
        params.push("$expand=Locations".to_string());
    }
    if let Some(sub) = &exp.sub_query {
        params.extend(sub_query_params(sub, encoding));
    }

    let name = parent.navigation_name(exp.entity);
    match params.is_empty() {
        true => name.to_string(),
        false => format!("{name}({})", params.join(";")),
    }
}

fn sub_query_params(sub: &SubQuery, encoding: Encoding) -> Vec<String> {
    let mut params = Vec::new();
    if let Some(filter) = sub.filter.as_deref().filter(|f| !f.is_empty()) {
        params.push(format!("$filter={}", encoding.apply(filter)));
    }
    if !sub.select.is_empty() {
        params.push(format!("$select={}", select(&sub.select, encoding)));
    }
    if !sub.orderby.is_empty() {
        params.push(format!("$orderby={}", order_by(&sub.orderby, encoding)));
    }
    if let Some(top) = sub.top {
        params.push(format!("$top={top}"));
    }
    if let Some(skip) = sub.skip {
        params.push(format!("$skip={skip}"));
    }
    params
}

fn select(properties: &[String], encoding: Encoding) -> String {
    properties.iter().map(|p| encoding.apply(p)).join(",")
}

fn order_by(clauses: &[OrderBy], encoding: Encoding) -> String {
    clauses
        .iter()
        .map(|clause| encoding.apply(&clause.to_string()).into_owned())
        .join(",")
}
