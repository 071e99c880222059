/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use serde_json::{json, Value};
use sta_datasource::{DataSourceConfig, Response, Result, Transport};
use url::Url;

pub const API_URL: &str = "https://sta.example.org";
pub const BASE: &str = "https://sta.example.org/FROST-Server/v1.1";

/// In-memory service answering from a fixed set of urls. Unknown urls
/// get a 404.
#[derive(Clone, Default)]
pub struct FixtureTransport {
    routes: BTreeMap<String, Response>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, response: Response) -> Self {
        self.routes.insert(normalize(url), response);
        self
    }

    pub fn ok(self, url: &str, data: Value) -> Self {
        self.route(url, Response::ok(data))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FixtureTransport {
    async fn get(&self, url: &Url) -> Result<Response> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self
            .routes
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(404, json!({"message": "Not Found"}))))
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).unwrap().to_string()
}

pub fn config() -> DataSourceConfig {
    DataSourceConfig {
        path: "FROST-Server/v1.1".to_string(),
        oauth2_token_url: Some("https://auth.example.org/token".to_string()),
        oauth2_username: Some("grafana".to_string()),
        oauth2_client_id: Some("dashboards".to_string()),
        ..DataSourceConfig::new(API_URL)
    }
}

/// Things with ids in `range`.
pub fn things(range: std::ops::Range<i64>) -> Vec<Value> {
    range
        .map(|id| json!({"@iot.id": id, "name": format!("Thing {id}")}))
        .collect()
}
