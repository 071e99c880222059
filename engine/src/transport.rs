/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use url::Url;

use crate::{auth, DataSourceConfig, Error, Result, SecureConfig};

/// An http response as seen by the paginator.
#[derive(Clone, PartialEq, Debug)]
pub struct Response {
    pub status: u16,
    pub data: Value,
}

/// The http GET primitive used to talk to the service.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &Url) -> Result<Response>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Response {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    pub fn ok(data: Value) -> Self {
        Self::new(200, data)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-provided error message, if any.
    pub fn message(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            data => data
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
        }
    }
}

impl ReqwestTransport {
    /// Build a client sending the configured access token, if any.
    pub fn new(config: &DataSourceConfig, secure: &SecureConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &secure.access_token {
            let mut value =
                HeaderValue::try_from(format!("Bearer {token}")).map_err(Error::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build().map_err(Error::BuildClient)?,
        })
    }

    /// Build a client, first obtaining an access token through the
    /// OAuth2 password grant if none was configured.
    pub async fn connect(config: &DataSourceConfig, secure: &SecureConfig) -> Result<Self> {
        if secure.access_token.is_some() || secure.oauth2_password.is_none() {
            return Self::new(config, secure);
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(Error::BuildClient)?;
        let token = auth::password_grant(&client, config, secure).await?;
        Self::new(
            config,
            &SecureConfig {
                access_token: Some(token),
                ..secure.clone()
            },
        )
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Response> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(Error::Request)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Error::ReadResponse)?;
        let data = serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
        Ok(Response { status, data })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_message() {
        let res = Response::new(400, json!({"code": 400, "message": "bad filter"}));
        assert!(!res.is_success());
        assert_eq!(res.message(), "bad filter");
        assert_eq!(Response::new(502, json!("Bad Gateway")).message(), "Bad Gateway");
        assert_eq!(Response::new(500, Value::Null).message(), "");
    }

    #[test]
    fn invalid_token_is_rejected() {
        let secure = SecureConfig {
            access_token: Some("bad\ntoken".to_string()),
            ..SecureConfig::default()
        };
        assert!(matches!(
            ReqwestTransport::new(&DataSourceConfig::default(), &secure),
            Err(Error::InvalidToken(_))
        ));
    }
}
