//! Token introspection contract (RFC 7662) and local validation.
//!
//! Fetching the introspection response is the job of an `Introspector`
//! implementation (HTTP-backed in `unitsvc-infra`, static in tests/dev). The
//! checks applied to the response are shared and live here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BearerToken, Principal, Scope, SubjectId};

/// Introspection response body (RFC 7662 §2.2), as returned by the
/// authorization server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Introspection {
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Space-delimited granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Expiry, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("token is inactive or expired")]
    InactiveToken,

    #[error("introspection unavailable: {0}")]
    Unavailable(String),
}

/// Validates a bearer credential and derives the principal behind it.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Introspect `token`, requiring every scope in `required`.
    async fn introspect(
        &self,
        token: &str,
        required: &[Scope],
    ) -> Result<Principal, IntrospectionError>;
}

#[async_trait]
impl<I> Introspector for Arc<I>
where
    I: Introspector + ?Sized,
{
    async fn introspect(
        &self,
        token: &str,
        required: &[Scope],
    ) -> Result<Principal, IntrospectionError> {
        (**self).introspect(token, required).await
    }
}

/// Deterministically check a principal against the required scopes at `now`.
pub fn check_principal(
    principal: &Principal,
    required: &[Scope],
    now: DateTime<Utc>,
) -> Result<(), IntrospectionError> {
    if !principal.active || principal.is_expired(now) {
        return Err(IntrospectionError::InactiveToken);
    }
    if let Some(missing) = required.iter().find(|s| !principal.has_scope(s)) {
        return Err(IntrospectionError::Unauthenticated(format!(
            "scope '{missing}' was not granted"
        )));
    }
    Ok(())
}

/// Turn an introspection response into a validated principal.
///
/// Note: this validates the response only; talking to the authorization
/// server is outside this function.
pub fn validate_introspection(
    response: &Introspection,
    token: &str,
    required: &[Scope],
    now: DateTime<Utc>,
) -> Result<Principal, IntrospectionError> {
    if !response.active {
        return Err(IntrospectionError::InactiveToken);
    }

    let subject: SubjectId = response
        .sub
        .as_deref()
        .ok_or_else(|| IntrospectionError::Unauthenticated("missing subject".to_string()))?
        .parse()
        .map_err(|e| IntrospectionError::Unauthenticated(format!("invalid subject: {e}")))?;

    let expires_at = match response.exp {
        Some(exp) => Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| IntrospectionError::Unauthenticated(format!("invalid exp {exp}")))?,
        None => return Err(IntrospectionError::Unauthenticated("missing exp".to_string())),
    };

    let principal = Principal::new(
        subject,
        response.client_id.clone().unwrap_or_default(),
        expires_at,
        Scope::parse_list(response.scope.as_deref().unwrap_or_default()),
    )
    .with_credential(BearerToken::new(token));

    check_principal(&principal, required, now)?;
    Ok(principal)
}

/// In-memory introspector for tests/dev: a fixed token → principal table.
#[derive(Debug, Default)]
pub struct StaticIntrospector {
    tokens: RwLock<HashMap<String, Principal>>,
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the principal a token resolves to.
    pub fn insert(&self, token: impl Into<String>, principal: Principal) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), principal);
        }
    }

    pub fn revoke(&self, token: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(token);
        }
    }
}

#[async_trait]
impl Introspector for StaticIntrospector {
    async fn introspect(
        &self,
        token: &str,
        required: &[Scope],
    ) -> Result<Principal, IntrospectionError> {
        let principal = self
            .tokens
            .read()
            .map_err(|_| IntrospectionError::Unavailable("lock poisoned".to_string()))?
            .get(token)
            .cloned()
            .ok_or_else(|| IntrospectionError::Unauthenticated("unknown token".to_string()))?;

        check_principal(&principal, required, Utc::now())?;
        Ok(principal.with_credential(BearerToken::new(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn response(now: DateTime<Utc>, scope: &str) -> Introspection {
        Introspection {
            active: true,
            sub: Some(SubjectId::new().to_string()),
            client_id: Some("web-app".to_string()),
            scope: Some(scope.to_string()),
            exp: Some((now + Duration::minutes(10)).timestamp()),
        }
    }

    #[test]
    fn active_response_with_scope_yields_principal() {
        let now = Utc::now();
        let resp = response(now, "units.list units.get");

        let principal =
            validate_introspection(&resp, "tok", &[Scope::UNITS_GET], now).unwrap();

        assert_eq!(principal.client_id, "web-app");
        assert_eq!(principal.subject.to_string(), resp.sub.unwrap());
        assert_eq!(principal.credential().unwrap().expose(), "tok");
    }

    #[test]
    fn inactive_response_is_rejected() {
        let now = Utc::now();
        let mut resp = response(now, "units.list");
        resp.active = false;
        assert_eq!(
            validate_introspection(&resp, "tok", &[], now),
            Err(IntrospectionError::InactiveToken)
        );
    }

    #[test]
    fn expired_response_is_inactive() {
        let now = Utc::now();
        let mut resp = response(now, "units.list");
        resp.exp = Some((now - Duration::seconds(1)).timestamp());
        assert_eq!(
            validate_introspection(&resp, "tok", &[], now),
            Err(IntrospectionError::InactiveToken)
        );
    }

    #[test]
    fn missing_scope_is_unauthenticated() {
        let now = Utc::now();
        let resp = response(now, "units.list");
        let err = validate_introspection(&resp, "tok", &[Scope::UNITS_DELETE], now).unwrap_err();
        assert!(matches!(err, IntrospectionError::Unauthenticated(msg) if msg.contains("units.delete")));
    }

    #[test]
    fn non_uuid_subject_is_unauthenticated() {
        let now = Utc::now();
        let mut resp = response(now, "units.list");
        resp.sub = Some("alice".to_string());
        assert!(matches!(
            validate_introspection(&resp, "tok", &[], now),
            Err(IntrospectionError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn static_introspector_resolves_registered_tokens() {
        let introspector = StaticIntrospector::new();
        let principal = Principal::new(
            SubjectId::new(),
            "cli",
            Utc::now() + Duration::minutes(1),
            vec![Scope::UNITS_LIST],
        );
        introspector.insert("good", principal.clone());

        let resolved = introspector
            .introspect("good", &[Scope::UNITS_LIST])
            .await
            .unwrap();
        assert_eq!(resolved.subject, principal.subject);
        assert_eq!(resolved.credential().unwrap().expose(), "good");

        assert!(matches!(
            introspector.introspect("bad", &[]).await,
            Err(IntrospectionError::Unauthenticated(_))
        ));

        introspector.revoke("good");
        assert!(introspector.introspect("good", &[]).await.is_err());
    }
}
