use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Scope;

/// Identity of an authenticated subject (human user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(Uuid);

impl SubjectId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for SubjectId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<SubjectId> for Uuid {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

impl FromStr for SubjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Bearer credential a principal was derived from.
///
/// Kept so outbound calls made on behalf of the caller can forward it.
/// `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// An authenticated principal, derived per call from token introspection.
///
/// Lives exactly as long as one call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: SubjectId,
    pub client_id: String,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub scopes: Vec<Scope>,
    credential: Option<BearerToken>,
}

impl Principal {
    pub fn new(
        subject: SubjectId,
        client_id: impl Into<String>,
        expires_at: DateTime<Utc>,
        scopes: Vec<Scope>,
    ) -> Self {
        Self {
            subject,
            client_id: client_id.into(),
            active: true,
            expires_at,
            scopes,
            credential: None,
        }
    }

    pub fn with_credential(mut self, token: BearerToken) -> Self {
        self.credential = Some(token);
        self
    }

    pub fn credential(&self) -> Option<&BearerToken> {
        self.credential.as_ref()
    }

    pub fn has_scope(&self, scope: &Scope) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn credential_is_redacted_in_debug_output() {
        let principal = Principal::new(
            SubjectId::new(),
            "web",
            Utc::now() + Duration::minutes(5),
            vec![Scope::UNITS_LIST],
        )
        .with_credential(BearerToken::new("super-secret"));

        let rendered = format!("{principal:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(principal.credential().unwrap().expose(), "super-secret");
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let principal = Principal::new(SubjectId::new(), "web", now, vec![]);
        assert!(principal.is_expired(now));
        assert!(!principal.is_expired(now - Duration::seconds(1)));
    }
}
