/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sta_query::{
    apply_template_variables, build_url, raw_frame, response, transform, EntityKind, Frame,
    Query, ScopedVars, TemplateSrv, Variables,
};
use tokio::sync::watch;
use tracing::instrument;
use url::Url;

use crate::{DataSourceConfig, Error, PageOptions, Paginator, Result, Transport};

const BAD_REQUEST: &str =
    "Authentication to data source failed. Please verify your OAuth2 configuration.";
const UNAUTHORIZED: &str = "OAuth2 authentication failed. Please check your credentials.";
const NOT_FOUND: &str = "API endpoint not found. Please check your API URL and path.";

/// A SensorThings API service as seen by the dashboard host.
pub struct DataSource<T> {
    config: DataSourceConfig,
    transport: T,
    template_srv: Box<dyn TemplateSrv + Send + Sync>,
}

#[derive(Clone, Default, Debug)]
pub struct QueryOptions {
    /// Return the fetched entities in a single column instead of
    /// transforming them.
    pub raw: bool,
    pub cancel: Option<watch::Receiver<bool>>,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct TestResult {
    pub status: TestStatus,
    pub message: String,
}

/// An option of a dashboard variable.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct MetricFindValue {
    pub text: String,
    pub value: String,
}

impl<T: Transport> DataSource<T> {
    pub fn new(config: DataSourceConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            template_srv: Box::new(Variables::new()),
        }
    }

    pub fn with_template_srv<S: TemplateSrv + Send + Sync + 'static>(mut self, srv: S) -> Self {
        self.template_srv = Box::new(srv);
        self
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    /// Run all targets concurrently. A failing target yields an error
    /// frame without affecting the others.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub async fn query(
        &self,
        targets: &[Query],
        scoped: &ScopedVars,
        options: &QueryOptions,
    ) -> Vec<Frame> {
        join_all(targets.iter().map(|target| async move {
            match self.run_query(target, scoped, options).await {
                Ok(frames) => frames,
                Err(e) => {
                    log::warn!("query {} failed: {e}", target.ref_id.as_deref().unwrap_or("-"));
                    vec![Frame::error(target.ref_id.clone(), query_error(&e))]
                }
            }
        }))
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    async fn run_query(
        &self,
        target: &Query,
        scoped: &ScopedVars,
        options: &QueryOptions,
    ) -> Result<Vec<Frame>> {
        let query = apply_template_variables(target, scoped, &*self.template_srv);
        let paginator = Paginator::new(
            &self.transport,
            PageOptions {
                default_page_size: self.config.default_page_size,
                max_pages: self.config.max_pages,
                cancel: options.cancel.clone(),
            },
        );
        let result = paginator
            .fetch_all(&self.config.base_url(), &query)
            .await?;
        let payload = result.to_payload();
        Ok(match options.raw {
            true => vec![raw_frame(&payload, &query)],
            false => transform(&payload, &query, self.config.source_crs),
        })
    }

    #[instrument(skip_all, fields(api_url = %self.config.api_url))]
    pub async fn test_connection(&self) -> TestResult {
        if let Err(e) = self.config.validate() {
            return TestResult::error(e.to_string());
        }

        match self.get_things().await {
            Ok(status) => TestResult {
                status: TestStatus::Success,
                message: format!(
                    "Successfully connected to SensorThings API! Response status: {status}"
                ),
            },
            Err(e) => {
                log::warn!("connection test failed: {e}");
                TestResult::error(match e.status() {
                    Some(400) => BAD_REQUEST.to_string(),
                    Some(401) => UNAUTHORIZED.to_string(),
                    Some(404) => NOT_FOUND.to_string(),
                    _ => format!("Connection failed: {e}"),
                })
            }
        }
    }

    async fn get_things(&self) -> Result<u16> {
        let url = Url::parse(&format!(
            "{}/{}",
            self.config.base_url(),
            EntityKind::Things
        ))?;
        let response = self.transport.get(&url).await?;
        match response.is_success() {
            true => Ok(response.status),
            false => Err(Error::Status {
                status: response.status,
                message: response.message(),
            }),
        }
    }

    /// Options for a dashboard variable, from a single request.
    pub async fn resolve_template_values(
        &self,
        query: &Query,
        scoped: &ScopedVars,
    ) -> Vec<MetricFindValue> {
        let query = apply_template_variables(query, scoped, &*self.template_srv);
        match self.fetch_values(&query).await {
            Ok(values) => values,
            Err(e) => {
                log::warn!("failed to resolve variable values: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_values(&self, query: &Query) -> Result<Vec<MetricFindValue>> {
        let url = Url::parse(&build_url(&self.config.base_url(), query))?;
        let res = self.transport.get(&url).await?;
        if !res.is_success() {
            return Err(Error::Status {
                status: res.status,
                message: res.message(),
            });
        }

        Ok(response::records(&res.data)
            .iter()
            .filter_map(|entity| {
                let value = id_string(entity.get(response::ID)?)?;
                let labels: &[&str] = match query.entity {
                    EntityKind::Observations => &["resultTime", "phenomenonTime"],
                    _ => &["name"],
                };
                let text = labels
                    .iter()
                    .find_map(|key| entity.get(*key).and_then(Value::as_str))
                    .filter(|text| !text.is_empty())
                    .map_or_else(|| value.clone(), str::to_string);
                Some(MetricFindValue { text, value })
            })
            .collect())
    }
}

impl TestResult {
    fn error(message: String) -> Self {
        Self {
            status: TestStatus::Error,
            message,
        }
    }
}

fn query_error(e: &Error) -> String {
    match e.status() {
        Some(400) => BAD_REQUEST.to_string(),
        Some(401) => UNAUTHORIZED.to_string(),
        _ => format!("Query failed: {e}"),
    }
}

fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
