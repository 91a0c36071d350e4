//! Class-membership authority contract.
//!
//! The membership authority is the source of truth for which classes a
//! principal belongs to. It is consulted on every call; answers are never
//! cached.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use unitsvc_core::{ClassId, ServiceError};

use crate::{Principal, SubjectId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The authority recognised no membership record for the principal.
    #[error("no membership found")]
    NotFound,

    #[error("membership authority failure: {0}")]
    Internal(String),
}

impl From<MembershipError> for ServiceError {
    fn from(value: MembershipError) -> Self {
        match value {
            MembershipError::NotFound => ServiceError::NotFound,
            MembershipError::Internal(msg) => ServiceError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait MembershipAuthority: Send + Sync {
    /// All classes `principal` currently belongs to.
    async fn list_classes(&self, principal: &Principal) -> Result<Vec<ClassId>, MembershipError>;
}

#[async_trait]
impl<M> MembershipAuthority for Arc<M>
where
    M: MembershipAuthority + ?Sized,
{
    async fn list_classes(&self, principal: &Principal) -> Result<Vec<ClassId>, MembershipError> {
        (**self).list_classes(principal).await
    }
}

/// In-memory membership table for tests/dev.
///
/// Unknown subjects belong to no class.
#[derive(Debug, Default)]
pub struct StaticMembership {
    members: RwLock<HashMap<SubjectId, HashSet<ClassId>>>,
}

impl StaticMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enroll(&self, subject: SubjectId, class_id: ClassId) {
        if let Ok(mut members) = self.members.write() {
            members.entry(subject).or_default().insert(class_id);
        }
    }

    pub fn withdraw(&self, subject: SubjectId, class_id: ClassId) {
        if let Ok(mut members) = self.members.write() {
            if let Some(classes) = members.get_mut(&subject) {
                classes.remove(&class_id);
            }
        }
    }
}

#[async_trait]
impl MembershipAuthority for StaticMembership {
    async fn list_classes(&self, principal: &Principal) -> Result<Vec<ClassId>, MembershipError> {
        let members = self
            .members
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".to_string()))?;

        Ok(members
            .get(&principal.subject)
            .map(|classes| classes.iter().copied().collect())
            .unwrap_or_default())
    }
}
