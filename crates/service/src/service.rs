use std::sync::Arc;

use async_trait::async_trait;

use unitsvc_auth::CallContext;
use unitsvc_core::{ClassId, ServiceResult, Unit, UnitId};

/// Operation names, as used for log actions and metric labels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    ListUnits,
    GetUnit,
    CreateUnit,
    RenameUnit,
    DeleteUnit,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::ListUnits => "ListUnits",
            Method::GetUnit => "GetUnit",
            Method::CreateUnit => "CreateUnit",
            Method::RenameUnit => "RenameUnit",
            Method::DeleteUnit => "DeleteUnit",
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five unit operations.
///
/// Every operation takes the authenticated [`CallContext`] explicitly. A
/// caller who is not a member of the relevant class gets
/// [`ServiceError::NotFound`](unitsvc_core::ServiceError::NotFound), exactly
/// as if the resource did not exist.
#[async_trait]
pub trait UnitService: Send + Sync {
    /// Ids of every unit under `class_id`.
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>>;

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit>;

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()>;

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()>;

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()>;
}

#[async_trait]
impl<T> UnitService for Arc<T>
where
    T: UnitService + ?Sized,
{
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        (**self).list_units(ctx, class_id).await
    }

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        (**self).get_unit(ctx, unit_id).await
    }

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()> {
        (**self).create_unit(ctx, class_id, title).await
    }

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()> {
        (**self).rename_unit(ctx, unit_id, title).await
    }

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()> {
        (**self).delete_unit(ctx, unit_id).await
    }
}
