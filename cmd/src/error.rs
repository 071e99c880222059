/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] sta_query::Error),
    #[error(transparent)]
    DataSource(#[from] sta_datasource::Error),
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed to serialize output: {0}")]
    Serialize(serde_json::Error),
    #[error("connection test failed")]
    ConnectionFailed,
}
