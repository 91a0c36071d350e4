//! Class-membership lookups against the class service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use unitsvc_auth::{MembershipAuthority, MembershipError, Principal};
use unitsvc_core::ClassId;

use super::{ClientError, endpoint};

const CLASSES_PATH: &str = "classes/";

#[derive(Debug, Deserialize)]
struct ClassesResponse {
    #[serde(default)]
    classes: Vec<ClassId>,
}

/// Asks the class service which classes the caller belongs to.
///
/// The caller's own bearer credential is forwarded, so the class service
/// answers for exactly that principal.
#[derive(Debug, Clone)]
pub struct HttpMembershipAuthority {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpMembershipAuthority {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint(base_url, CLASSES_PATH)?,
        })
    }
}

#[async_trait]
impl MembershipAuthority for HttpMembershipAuthority {
    async fn list_classes(&self, principal: &Principal) -> Result<Vec<ClassId>, MembershipError> {
        let token = principal
            .credential()
            .ok_or_else(|| MembershipError::Internal("principal carries no credential".to_string()))?;

        let response = self
            .http
            .get(self.endpoint.clone())
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| MembershipError::Internal(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(MembershipError::NotFound),
            status if !status.is_success() => {
                return Err(MembershipError::Internal(format!(
                    "class service returned {status}"
                )));
            }
            _ => {}
        }

        let body: ClassesResponse = response
            .json()
            .await
            .map_err(|e| MembershipError::Internal(format!("invalid class service body: {e}")))?;

        Ok(body.classes)
    }
}
