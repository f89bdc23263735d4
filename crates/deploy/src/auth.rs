//! Credential-for-token exchange.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DeployError;

/// Bearer credentials returned by the login endpoint.
///
/// Field names are accepted in camelCase, PascalCase or snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    #[serde(alias = "TokenType", alias = "token_type")]
    pub token_type: String,
    #[serde(alias = "AccessToken", alias = "access_token")]
    pub access_token: String,
}

impl AuthToken {
    /// Value for the `Authorization` header: `<tokenType> <accessToken>`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Exchanges a username and password for an [`AuthToken`].
pub struct AuthClient {
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POSTs `{"email", "password"}` as JSON to `endpoint`.
    ///
    /// Any failure is fatal to the caller; nothing is retried.
    pub async fn get_token(
        &self,
        username: &str,
        password: &str,
        endpoint: &Url,
    ) -> Result<AuthToken, DeployError> {
        debug!(endpoint = %endpoint, "requesting token");

        let resp = self
            .http
            .post(endpoint.clone())
            .json(&TokenRequest {
                email: username,
                password,
            })
            .send()
            .await
            .map_err(DeployError::AuthTransport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeployError::AuthFailed {
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(DeployError::AuthTransport)?;
        let token: AuthToken = serde_json::from_slice(&body)?;
        info!(token_type = %token.token_type, "token obtained");
        Ok(token)
    }
}
