/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::path::Path;

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::Value;
use sta_query::{build_url, transform, Crs, Query};

const BASE: &str = "https://sta.example.org/FROST-Server/v1.1";

fn load(case: &str) -> (Query, Value) {
    let path = Path::new("../tests/fixtures").join(case);
    let query = Query::load(&path.join("query.json")).unwrap();
    let response =
        serde_json::from_str(&std::fs::read_to_string(path.join("response.json")).unwrap())
            .unwrap();
    (query, response)
}

fn bench_build_url(c: &mut Criterion, test_name: &str, case: &str) {
    let (query, _) = load(case);
    c.bench_function(test_name, |b| {
        b.iter(|| build_url(BASE, &query))
    });
}

fn bench_transform(c: &mut Criterion, test_name: &str, case: &str) {
    let (query, response) = load(case);
    c.bench_function(test_name, |b| {
        b.iter(|| transform(&response, &query, Crs::Lv95))
    });
}

fn bench_datastreams_url(c: &mut Criterion) {
    bench_build_url(c, "datastreams_observations_url", "datastreams_observations")
}

fn bench_historical_locations_url(c: &mut Criterion) {
    bench_build_url(c, "things_historical_locations_url", "things_historical_locations")
}

fn bench_datastreams_transform(c: &mut Criterion) {
    bench_transform(c, "datastreams_observations_transform", "datastreams_observations")
}

fn bench_locations_transform(c: &mut Criterion) {
    bench_transform(c, "locations_things_transform", "locations_things")
}

criterion_group!(
    benches,
    bench_datastreams_url,
    bench_historical_locations_url,
    bench_datastreams_transform,
    bench_locations_transform
);
criterion_main!(benches);
