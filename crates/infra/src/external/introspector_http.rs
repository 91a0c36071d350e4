//! RFC 7662 token introspection over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use url::Url;

use unitsvc_auth::{Introspection, IntrospectionError, Introspector, Principal, Scope, validate_introspection};

use super::{ClientError, endpoint};
use crate::config::HydraConfig;

const INTROSPECT_PATH: &str = "oauth2/introspect";

/// Introspects bearer tokens against an OAuth2 authorization server.
///
/// The service authenticates itself with HTTP basic client credentials. A
/// 401/403 answer means the token could not be vouched for; any other
/// non-success status or transport failure is `Unavailable`.
#[derive(Debug, Clone)]
pub struct HttpIntrospector {
    http: reqwest::Client,
    endpoint: Url,
    client_id: String,
    client_secret: String,
}

impl HttpIntrospector {
    pub fn new(config: &HydraConfig, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!config.tls_verify)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint(&config.cluster_url, INTROSPECT_PATH)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }
}

#[async_trait]
impl Introspector for HttpIntrospector {
    async fn introspect(
        &self,
        token: &str,
        required: &[Scope],
    ) -> Result<Principal, IntrospectionError> {
        let scope = Scope::join(required);
        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("token", token), ("scope", scope.as_str())])
            .send()
            .await
            .map_err(|e| IntrospectionError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(IntrospectionError::Unauthenticated(format!(
                    "introspection rejected with {}",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(IntrospectionError::Unavailable(format!(
                    "introspection returned {status}"
                )));
            }
            _ => {}
        }

        let body: Introspection = response
            .json()
            .await
            .map_err(|e| IntrospectionError::Unavailable(format!("invalid introspection body: {e}")))?;

        validate_introspection(&body, token, required, Utc::now())
    }
}
