/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::path::Path;

use serde::{Deserialize, Serialize};
use sta_query::Crs;

use crate::{Error, Result};

/// Data source configuration file: plain settings plus a `secure`
/// section holding credentials.
#[derive(Serialize, Deserialize, Clone, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(flatten)]
    pub datasource: DataSourceConfig,
    #[serde(default)]
    pub secure: SecureConfig,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    #[serde(default)]
    pub api_url: String,
    /// Path prefix appended to the api url.
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_client_id: Option<String>,
    #[serde(default = "DataSourceConfig::default_page_size")]
    pub default_page_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub source_crs: Crs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecureConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| Error::ReadConfig(path.to_path_buf(), e))?;
        serde_yaml::from_str(&data).map_err(|e| Error::DecodeConfig(path.to_path_buf(), e))
    }
}

impl DataSourceConfig {
    fn default_page_size() -> u64 {
        100
    }

    pub fn new<U: Into<String>>(api_url: U) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Check the settings required to connect.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("API URL is required"));
        }
        if is_blank(&self.oauth2_token_url) {
            return Err(Error::Config("OAuth2 token URL is required"));
        }
        if is_blank(&self.oauth2_username) {
            return Err(Error::Config("OAuth2 username is required"));
        }
        if is_blank(&self.oauth2_client_id) {
            return Err(Error::Config("OAuth2 client ID is required"));
        }
        Ok(())
    }

    /// Service root: the api url followed by the path prefix.
    pub fn base_url(&self) -> String {
        let path = self.path.trim_matches('/');
        match path.is_empty() {
            true => self.api_url.trim_end_matches('/').to_string(),
            false => format!("{}/{path}", self.api_url.trim_end_matches('/')),
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            path: String::new(),
            oauth2_token_url: None,
            oauth2_username: None,
            oauth2_client_id: None,
            default_page_size: Self::default_page_size(),
            max_pages: None,
            source_crs: Crs::default(),
            timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for SecureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("SecureConfig")
            .field("oauth2_password", &redact(&self.oauth2_password))
            .field("oauth2_client_secret", &redact(&self.oauth2_client_secret))
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
