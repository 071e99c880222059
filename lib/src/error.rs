/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown entity kind: {0}")]
    UnknownEntity(String),
    #[error("unknown coordinate reference system: {0}")]
    UnknownCrs(String),
    #[error("failed to read query file: {0}: {1}")]
    ReadQuery(PathBuf, std::io::Error),
    #[error("failed to decode query file: {0}: {1}")]
    DecodeQuery(PathBuf, serde_json::Error),
    #[error("invalid time value: {0}: {1}")]
    InvalidTime(String, chrono::ParseError),
    #[error("missing time value")]
    MissingTime,
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
    #[error("coordinate transformation failed: {0}")]
    Projection(#[from] proj4rs::errors::Error),
    #[error("invalid filter: {0}")]
    InvalidFilter(&'static str),
}
