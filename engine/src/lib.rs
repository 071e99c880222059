/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod auth;
mod config;
mod datasource;
mod error;
mod paginate;
mod transport;

pub use config::{Config, DataSourceConfig, SecureConfig};
pub use datasource::{DataSource, MetricFindValue, QueryOptions, TestResult, TestStatus};
pub use error::{Error, Result};
pub use paginate::{PageOptions, Paginator};
pub use transport::{ReqwestTransport, Response, Transport};
