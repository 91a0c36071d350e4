use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use unitsvc_core::{ClassId, ServiceError, Unit, UnitId};

/// Store failure.
///
/// `NotFound` is the only signal the service core recognises; everything else
/// is reported as an internal failure with its message unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unit not found")]
    NotFound,

    #[error("unit {0} already exists")]
    Duplicate(UnitId),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Durable keyed storage for units, queryable by id and by owning class.
#[async_trait]
pub trait UnitStore: Send + Sync {
    async fn get_by_id(&self, id: UnitId) -> Result<Unit, StoreError>;

    /// Every unit owned by `class_id`, oldest first.
    async fn list_by_class(&self, class_id: ClassId) -> Result<Vec<Unit>, StoreError>;

    async fn insert(&self, unit: Unit) -> Result<(), StoreError>;

    /// Persist a changed title. A missing row is `NotFound`.
    async fn update(&self, unit: Unit) -> Result<(), StoreError>;

    /// Remove a row. Removing an absent row succeeds.
    async fn delete(&self, id: UnitId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> UnitStore for Arc<S>
where
    S: UnitStore + ?Sized,
{
    async fn get_by_id(&self, id: UnitId) -> Result<Unit, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn list_by_class(&self, class_id: ClassId) -> Result<Vec<Unit>, StoreError> {
        (**self).list_by_class(class_id).await
    }

    async fn insert(&self, unit: Unit) -> Result<(), StoreError> {
        (**self).insert(unit).await
    }

    async fn update(&self, unit: Unit) -> Result<(), StoreError> {
        (**self).update(unit).await
    }

    async fn delete(&self, id: UnitId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
