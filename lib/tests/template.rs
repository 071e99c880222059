/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use sta_query::{
    apply_template_variables, build_url, EntityKind, FilterCondition, FilterValue, Operator, Query,
    ScopedVars, TemplateSrv, Variables,
};

fn vars() -> Variables {
    [
        ("thing", "42"),
        ("station", "Roof"),
        ("from", "2024-01-01T00:00:00Z"),
        ("to", "2024-02-01T00:00:00Z"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn own_entity_variable_becomes_entity_id() {
    let query = Query::new(EntityKind::Things)
        .with_filter(FilterCondition::variable(EntityKind::Things, "thing"))
        .with_expand(EntityKind::Locations, None);
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.entity_id, Some(42));
    assert!(resolved.filters.is_empty());
    assert_eq!(
        build_url("http://sta", &resolved),
        "http://sta/Things(42)?$expand=Locations"
    );
}

#[test]
fn non_integer_value_is_kept_on_the_filter() {
    let mut filter = FilterCondition::variable(EntityKind::Things, "station");
    if let FilterCondition::Variable(f) = &mut filter {
        f.field = "name".to_string();
    }
    let query = Query::new(EntityKind::Things).with_filter(filter);
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.entity_id, None);
    let var = resolved.filters[0].as_variable().unwrap();
    assert_eq!(var.value, Some(FilterValue::from("Roof")));
}

#[test]
fn other_entity_variable_filters_the_query() {
    let query = Query::new(EntityKind::Datastreams)
        .with_filter(FilterCondition::variable(EntityKind::Things, "thing"));
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.entity_id, None);
    assert_eq!(resolved.filter_expression(), "Thing/@iot.id eq 42");
}

#[test]
fn unresolved_variable_keeps_placeholder() {
    let query = Query::new(EntityKind::Datastreams)
        .with_filter(FilterCondition::variable(EntityKind::Sensors, "sensor"));
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.filters[0].as_variable().unwrap().value, None);
    assert_eq!(resolved.filter_expression(), "Sensor/@iot.id eq $sensor");
}

#[test]
fn duplicate_variable_filters_are_dropped() {
    let query = Query::new(EntityKind::Datastreams)
        .with_filter(FilterCondition::variable(EntityKind::Things, "thing"))
        .with_filter(FilterCondition::variable(EntityKind::Things, "station"));
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.filters.len(), 1);
}

#[test]
fn filter_values_alias_and_expression() {
    let query = Query::new(EntityKind::Observations)
        .with_filter(FilterCondition::basic("name", Operator::Eq, "$station"))
        .with_filter(FilterCondition::time_range("phenomenonTime", "${from}", "[[to]]"))
        .with_alias("Observations at $station");
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.alias.as_deref(), Some("Observations at Roof"));
    assert_eq!(
        resolved.filter_expression(),
        "name eq 'Roof' and phenomenonTime ge '2024-01-01T00:00:00Z' \
         and phenomenonTime le '2024-02-01T00:00:00Z'"
    );

    let query = Query::new(EntityKind::Things).with_expression("$filter=name eq '$station'");
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &vars());
    assert_eq!(resolved.free_form(), Some("$filter=name eq 'Roof'"));
}

#[test]
fn scoped_vars_override() {
    let scoped = [("thing", "7")].into_iter().collect::<ScopedVars>();
    let query = Query::new(EntityKind::Things)
        .with_filter(FilterCondition::variable(EntityKind::Things, "thing"));
    let resolved = apply_template_variables(&query, &scoped, &vars());
    assert_eq!(resolved.entity_id, Some(7));
}

/// A host-provided substitution service.
struct Upper;

impl TemplateSrv for Upper {
    fn replace(&self, text: &str, _scoped: &ScopedVars) -> String {
        text.to_uppercase()
    }
}

#[test]
fn custom_template_service() {
    let query = Query::new(EntityKind::Sensors).with_alias("sensors");
    let resolved = apply_template_variables(&query, &ScopedVars::new(), &Upper);
    assert_eq!(resolved.alias.as_deref(), Some("SENSORS"));
}
