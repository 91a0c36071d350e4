use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use url::Url;

use unitsvc_auth::CallContext;
use unitsvc_core::{ClassId, ServiceError, ServiceResult, Unit, UnitId};
use unitsvc_service::UnitService;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    #[error("failed to build http client: {0}")]
    Build(String),
}

#[derive(Debug, Deserialize)]
struct UnitBody {
    id: UnitId,
    class_id: ClassId,
    title: String,
}

#[derive(Debug, Deserialize)]
struct GetUnitBody {
    unit: UnitBody,
}

#[derive(Debug, Deserialize)]
struct ListUnitsBody {
    units: Vec<UnitId>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// HTTP client for a remote unit service.
#[derive(Debug, Clone)]
pub struct HttpUnitClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpUnitClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> ServiceResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::internal(format!("invalid request url: {e}")))
    }

    /// Attach the caller's credential and request id.
    fn authorized(&self, ctx: &CallContext, builder: RequestBuilder) -> ServiceResult<RequestBuilder> {
        let token = ctx
            .principal()
            .credential()
            .ok_or_else(|| ServiceError::internal("call context carries no credential to forward"))?;
        Ok(builder
            .bearer_auth(token.expose())
            .header(REQUEST_ID_HEADER, ctx.trace().request_id().to_string()))
    }

    async fn send(&self, builder: RequestBuilder) -> ServiceResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::internal(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        tracing::debug!(%status, error = %body.error, message = %body.message, "unit service call failed");
        Err(match status {
            StatusCode::NOT_FOUND => ServiceError::NotFound,
            StatusCode::BAD_REQUEST => ServiceError::bad_request(body.message),
            _ => ServiceError::internal(format!("{status}: {}", body.message)),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
        response
            .json()
            .await
            .map_err(|e| ServiceError::internal(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl UnitService for HttpUnitClient {
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        let request = self
            .http
            .get(self.url("units")?)
            .query(&[("classID", class_id.to_string())]);
        let response = self.send(self.authorized(ctx, request)?).await?;
        let body: ListUnitsBody = Self::decode(response).await?;
        Ok(body.units)
    }

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        let request = self.http.get(self.url(&format!("units/{unit_id}"))?);
        let response = self.send(self.authorized(ctx, request)?).await?;
        let body: GetUnitBody = Self::decode(response).await?;
        Ok(Unit::new(body.unit.id, body.unit.class_id, body.unit.title))
    }

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()> {
        let request = self
            .http
            .post(self.url("units")?)
            .json(&json!({ "class_id": class_id.to_string(), "title": title }));
        self.send(self.authorized(ctx, request)?).await?;
        Ok(())
    }

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()> {
        let request = self
            .http
            .patch(self.url(&format!("units/{unit_id}"))?)
            .json(&json!({ "title": title }));
        self.send(self.authorized(ctx, request)?).await?;
        Ok(())
    }

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()> {
        let request = self.http.delete(self.url(&format!("units/{unit_id}"))?);
        self.send(self.authorized(ctx, request)?).await?;
        Ok(())
    }
}
