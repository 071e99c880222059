/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde::Deserialize;
use tracing::instrument;

use crate::{DataSourceConfig, Error, Result, SecureConfig};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Obtain an access token with the OAuth2 resource owner password grant.
#[instrument(skip_all, fields(token_url = config.oauth2_token_url.as_deref()))]
pub(crate) async fn password_grant(
    client: &reqwest::Client,
    config: &DataSourceConfig,
    secure: &SecureConfig,
) -> Result<String> {
    config.validate()?;
    let token_url = config
        .oauth2_token_url
        .as_deref()
        .ok_or(Error::Config("OAuth2 token URL is required"))?;

    let response = client
        .post(token_url)
        .form(&form_params(config, secure))
        .send()
        .await
        .map_err(Error::Request)?;

    let status = response.status();
    if !status.is_success() {
        let message = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("failed to read token error response: {e}");
                String::new()
            }
        };
        return Err(Error::Status {
            status: status.as_u16(),
            message,
        });
    }

    let token = response
        .json::<TokenResponse>()
        .await
        .map_err(Error::ReadResponse)?;
    log::debug!("obtained oauth2 access token");
    token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(Error::MissingToken)
}

fn form_params<'a>(
    config: &'a DataSourceConfig,
    secure: &'a SecureConfig,
) -> Vec<(&'static str, &'a str)> {
    [
        ("grant_type", Some("password")),
        ("username", config.oauth2_username.as_deref()),
        ("password", secure.oauth2_password.as_deref()),
        ("client_id", config.oauth2_client_id.as_deref()),
        ("client_secret", secure.oauth2_client_secret.as_deref()),
    ]
    .into_iter()
    .filter_map(|(key, value)| Some((key, value?)))
    .collect()
}
