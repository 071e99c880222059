/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use sta_query::{
    build_url, Direction, EntityKind, Encoding, FilterCondition, Operator, Query, ResultFormat,
    SubQuery,
};

mod cases;

const BASE: &str = "https://sta.example.org/FROST-Server/v1.1";

define_tests!(
    url,
    [
        (datastreams_observations, "datastreams_observations"),
        (things_locations, "things_locations"),
        (sensors_datastreams, "sensors_datastreams"),
        (observations_plain, "observations_plain"),
        (empty_sensors, "empty_sensors"),
        (things_historical_locations, "things_historical_locations"),
        (feature_series, "feature_series"),
        (free_form_things, "free_form_things"),
        (locations_things, "locations_things")
    ]
);

fn url(case: &cases::Case) {
    let expected = case.expected.url.as_deref().unwrap();
    assert_eq!(build_url(BASE, &case.query), format!("{BASE}/{expected}"));
}

#[test]
fn observation_filter_moves_into_expansion() {
    let query = Query::new(EntityKind::Datastreams)
        .with_filter(FilterCondition::observation("result", Operator::Gt, "10"))
        .with_filter(FilterCondition::basic("name", Operator::Eq, "Air temperature"));
    let url = build_url(BASE, &query);
    assert_eq!(
        url,
        format!(
            "{BASE}/Datastreams?$filter=name%20eq%20%27Air%20temperature%27\
             &$expand=Observations($filter=result%20gt%2010)"
        )
    );
    assert!(!url.contains("?$filter=result"));
    assert!(query.expand.is_empty(), "input query was modified");
}

#[test]
fn observation_filter_on_other_entities_stays_top_level() {
    let query = Query::new(EntityKind::Observations)
        .with_filter(FilterCondition::observation("result", Operator::Gt, "10"));
    assert_eq!(
        build_url(BASE, &query),
        format!("{BASE}/Observations?$filter=result%20gt%2010")
    );
}

#[test]
fn stale_observation_filter_is_stripped() {
    let stale = SubQuery {
        filter: Some("result gt 10".to_string()),
        ..SubQuery::default()
    };
    let query = Query::new(EntityKind::Datastreams).with_expand(EntityKind::Observations, Some(stale));
    assert_eq!(build_url(BASE, &query), format!("{BASE}/Datastreams?$expand=Observations"));

    let stale = SubQuery {
        filter: Some("result gt 10".to_string()),
        top: Some(10),
        ..SubQuery::default()
    };
    let query = Query::new(EntityKind::Datastreams).with_expand(EntityKind::Observations, Some(stale));
    assert_eq!(
        build_url(BASE, &query),
        format!("{BASE}/Datastreams?$expand=Observations($top=10)")
    );
}

#[test]
fn unencoded_preview() {
    let query = Query::new(EntityKind::Things)
        .with_filter(FilterCondition::basic("name", Operator::Eq, "Roof"))
        .with_select(["name", "description"])
        .with_order_by("name", Direction::Desc);
    assert_eq!(
        query.url(BASE, Encoding::Unencoded),
        format!("{BASE}/Things?$filter=name eq 'Roof'&$select=name,description&$orderby=name desc")
    );
}

#[test]
fn parameter_order() {
    let query = Query::new(EntityKind::Observations)
        .with_skip(20)
        .with_top(10)
        .with_count(true)
        .with_result_format(ResultFormat::DataArray)
        .with_from_to("2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z")
        .with_as_of("2024-03-01T00:00:00Z");
    assert_eq!(
        query.url(BASE, Encoding::Unencoded),
        format!(
            "{BASE}/Observations?$top=10&$skip=20&$count=true&$resultFormat=dataArray\
             &asOf=2024-03-01T00:00:00Z&from=2024-01-01T00:00:00Z&to=2024-02-01T00:00:00Z"
        )
    );
    assert_eq!(
        build_url(BASE, &query),
        format!(
            "{BASE}/Observations?$top=10&$skip=20&$count=true&$resultFormat=dataArray\
             &asOf=2024-03-01T00%3A00%3A00Z&from=2024-01-01T00%3A00%3A00Z\
             &to=2024-02-01T00%3A00%3A00Z"
        )
    );
}

#[test]
fn to_one_navigation_names() {
    let query = Query::new(EntityKind::Datastreams)
        .with_expand(EntityKind::Things, None)
        .with_expand(EntityKind::Sensors, None)
        .with_expand(EntityKind::ObservedProperties, None);
    assert_eq!(
        build_url(BASE, &query),
        format!("{BASE}/Datastreams?$expand=Thing,Sensor,ObservedProperty")
    );
}

#[test]
fn self_bound_variable_stays_out_of_filter() {
    let query = Query::new(EntityKind::Things)
        .with_filter(FilterCondition::variable(EntityKind::Things, "thing"))
        .with_filter(FilterCondition::variable(EntityKind::Datastreams, "ds"));
    assert_eq!(
        query.url(BASE, Encoding::Unencoded),
        format!("{BASE}/Things?$filter=Datastream/@iot.id eq $ds")
    );
}

#[test]
fn trailing_slashes_and_entity_id() {
    let query = Query::new(EntityKind::Sensors).with_id(12);
    assert_eq!(
        build_url("http://localhost:8080/v1.1//", &query),
        "http://localhost:8080/v1.1/Sensors(12)"
    );
}

#[test]
fn blank_expression_is_ignored() {
    let query = Query::new(EntityKind::Sensors)
        .with_top(3)
        .with_expression("   ");
    assert_eq!(build_url(BASE, &query), format!("{BASE}/Sensors?$top=3"));
}
