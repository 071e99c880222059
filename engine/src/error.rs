/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::path::PathBuf;

use reqwest::header::InvalidHeaderValue;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Config(&'static str),
    #[error("failed to read configuration from {0}: {1}")]
    ReadConfig(PathBuf, std::io::Error),
    #[error("failed to decode configuration {0}: {1}")]
    DecodeConfig(PathBuf, serde_yaml::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid access token: {0}")]
    InvalidToken(InvalidHeaderValue),
    #[error("failed to build http client: {0}")]
    BuildClient(reqwest::Error),
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("failed to read response: {0}")]
    ReadResponse(reqwest::Error),
    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("token response does not contain an access token")]
    MissingToken,
    #[error("fetch cancelled")]
    Cancelled,
    #[error(transparent)]
    Query(#[from] sta_query::Error),
}

impl Error {
    /// The http status of a failed request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Request(e) | Error::ReadResponse(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
