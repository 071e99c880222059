/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde_json::json;
use sta_query::{
    filter::compile, EntityKind, FilterCondition, FilterValue, Geometry, Operator,
    SpatialOperator,
};

fn parse(value: serde_json::Value) -> Vec<FilterCondition> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn basic_equality() {
    let filters = parse(json!([
        {"kind": "basic", "field": "name", "operator": "eq", "value": "sensor1"}
    ]));
    assert_eq!(compile(&filters), "name eq 'sensor1'");
}

#[test]
fn string_functions() {
    let filters = [
        FilterCondition::basic("name", Operator::StartsWith, "Air"),
        FilterCondition::basic("name", Operator::EndsWith, "temp"),
        FilterCondition::basic("description", Operator::SubstringOf, "roof"),
    ];
    assert_eq!(
        compile(&filters),
        "startswith(name,'Air') and endswith(name,'temp') and substringof('roof',description)"
    );
}

#[test]
fn spatial_point_within() {
    let filters = parse(json!([{
        "kind": "spatial",
        "operator": "st_within",
        "geometryType": "Point",
        "coordinates": [7.5, 46.9]
    }]));
    assert_eq!(
        compile(&filters),
        "st_within(observedArea, geography'POINT (7.5 46.9)')"
    );
}

#[test]
fn spatial_distance() {
    let mut filter = FilterCondition::spatial(SpatialOperator::StDistance, &Geometry::point(7.0, 46.0));
    if let FilterCondition::Spatial(f) = &mut filter {
        f.field = "location".to_string();
        f.value = Some(FilterValue::from(0.5));
    }
    assert_eq!(
        compile([&filter]),
        "st_distance(location, geography'POINT (7 46)') le 0.5"
    );
}

#[test]
fn spatial_line_string() {
    let geometry = Geometry::line_string([(7.0, 46.0), (8.0, 47.0)]).unwrap();
    let filter = FilterCondition::spatial(SpatialOperator::StIntersects, &geometry);
    assert_eq!(
        compile([&filter]),
        "st_intersects(observedArea, geography'LINESTRING (7 46, 8 47)')"
    );
}

#[test]
fn open_polygon_ring_is_closed_once() {
    let filters = parse(json!([{
        "kind": "spatial",
        "operator": "st_intersects",
        "geometryType": "Polygon",
        "rings": [{"coordinates": [[7, 46], [8, 46], [8, 47]]}]
    }]));
    assert_eq!(
        compile(&filters),
        "st_intersects(observedArea, geography'POLYGON ((7 46, 8 46, 8 47, 7 46))')"
    );
}

#[test]
fn closed_polygon_ring_is_kept() {
    let filters = parse(json!([{
        "kind": "spatial",
        "operator": "st_within",
        "geometryType": "Polygon",
        "rings": [
            {"coordinates": [[7, 46], [8, 46], [8, 47], [7, 46]]},
            {"coordinates": [[7.2, 46.2], [7.4, 46.2], [7.4, 46.4]]}
        ]
    }]));
    assert_eq!(
        compile(&filters),
        "st_within(observedArea, geography'POLYGON ((7 46, 8 46, 8 47, 7 46), \
         (7.2 46.2, 7.4 46.2, 7.4 46.4, 7.2 46.2))')"
    );
}

#[test]
fn malformed_geometry_is_dropped() {
    let filters = parse(json!([
        {"kind": "spatial", "operator": "st_within", "geometryType": "Polygon",
         "rings": [{"coordinates": [[7, 46], [8, 46]]}]},
        {"kind": "spatial", "operator": "st_within", "geometryType": "LineString",
         "coordinates": [[7, 46]]},
        {"kind": "spatial", "operator": "st_within", "geometryType": "Polygon", "rings": []},
        {"kind": "basic", "field": "name", "operator": "ne", "value": "x"}
    ]));
    assert_eq!(compile(&filters), "name ne 'x'");
}

#[test]
fn temporal_range_and_date_parts() {
    let filters = [
        FilterCondition::time_range(
            "phenomenonTime",
            "2024-01-01T00:00:00Z",
            "2024-02-01T00:00:00Z",
        ),
        FilterCondition::temporal("resultTime", Operator::Year, 2024i64),
        FilterCondition::temporal("resultTime", Operator::Gt, "2024-01-15T00:00:00Z"),
    ];
    assert_eq!(
        compile(&filters),
        "phenomenonTime ge '2024-01-01T00:00:00Z' and phenomenonTime le '2024-02-01T00:00:00Z' \
         and year(resultTime) eq 2024 and resultTime gt '2024-01-15T00:00:00Z'"
    );
}

#[test]
fn measurement_and_observation_values() {
    let filters = parse(json!([
        {"kind": "measurement", "field": "result", "operator": "ge", "value": "12.5"},
        {"kind": "observation", "field": "phenomenonTime", "operator": "lt",
         "value": "2024-01-01T00:00:00Z"},
        {"kind": "observation", "field": "result", "operator": "startswith", "value": "1"}
    ]));
    assert_eq!(
        compile(&filters),
        "result ge 12.5 and phenomenonTime lt '2024-01-01T00:00:00Z'"
    );
}

#[test]
fn entity_filters_use_singular_names() {
    let filters = [
        FilterCondition::entity(EntityKind::ObservedProperties, "name", Operator::Eq, "Temperature"),
        FilterCondition::entity(EntityKind::Things, "@iot.id", Operator::Eq, 4i64),
        FilterCondition::entity(EntityKind::Sensors, "name", Operator::Eq, ""),
    ];
    assert_eq!(
        compile(&filters),
        "ObservedProperty/name eq 'Temperature' and Thing/@iot.id eq 4"
    );
}

#[test]
fn variable_filters() {
    let unresolved = FilterCondition::variable(EntityKind::Things, "thing");
    assert_eq!(compile([&unresolved]), "Thing/@iot.id eq $thing");

    let filters = parse(json!([{
        "kind": "variable", "entity": "Things", "variableName": "thing", "value": "Roof"
    }]));
    assert_eq!(compile(&filters), "Thing/@iot.id eq 'Roof'");
}

#[test]
fn complex_expression_verbatim() {
    let filters = [
        FilterCondition::complex("  (result gt 1 or result lt -1)  "),
        FilterCondition::complex(""),
    ];
    assert_eq!(compile(&filters), "(result gt 1 or result lt -1)");
}

#[test]
fn single_quotes_are_escaped() {
    let filter = FilterCondition::basic("name", Operator::Eq, "O'Brien's");
    assert_eq!(compile([&filter]), "name eq 'O''Brien''s'");
}

#[test]
fn joiners_and_parentheses_balance() {
    let polygon = Geometry::polygon([[(7.0, 46.0), (8.0, 46.0), (8.0, 47.0)]]).unwrap();
    let filters = [
        FilterCondition::basic("name", Operator::SubstringOf, "a"),
        FilterCondition::spatial(SpatialOperator::StWithin, &polygon),
        FilterCondition::temporal("phenomenonTime", Operator::Month, 5i64),
        FilterCondition::measurement("result", Operator::Le, 3i64),
        FilterCondition::entity(EntityKind::Datastreams, "name", Operator::StartsWith, "T"),
    ];
    let expr = compile(&filters);
    assert_eq!(expr.matches(" and ").count(), filters.len() - 1);
    assert_eq!(expr.matches('(').count(), expr.matches(')').count());
}
