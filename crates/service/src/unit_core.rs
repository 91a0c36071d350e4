//! The authorization-aware core service.
//!
//! Membership is fetched from the authority on every call and never cached.
//! Lookups by unit id hit the store first, so an unknown id and a unit in a
//! foreign class are indistinguishable to the caller.

use async_trait::async_trait;

use unitsvc_auth::{CallContext, ClassMembership, MembershipAuthority, authorize_class};
use unitsvc_core::{ClassId, Entity, ServiceResult, Unit, UnitId};
use unitsvc_infra::store::UnitStore;

use crate::service::UnitService;

#[derive(Debug)]
pub struct UnitCore<S, M> {
    store: S,
    membership: M,
}

impl<S, M> UnitCore<S, M>
where
    S: UnitStore,
    M: MembershipAuthority,
{
    pub fn new(store: S, membership: M) -> Self {
        Self { store, membership }
    }

    async fn membership(&self, ctx: &CallContext) -> ServiceResult<ClassMembership> {
        let classes = self.membership.list_classes(ctx.principal()).await?;
        Ok(ClassMembership::new(classes))
    }

    async fn authorize(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<()> {
        let membership = self.membership(ctx).await?;
        authorize_class(&membership, class_id)?;
        Ok(())
    }

    /// Load a unit and check the caller may see it.
    async fn authorized_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        let unit = self.store.get_by_id(unit_id).await?;
        self.authorize(ctx, unit.class_id()).await?;
        Ok(unit)
    }
}

#[async_trait]
impl<S, M> UnitService for UnitCore<S, M>
where
    S: UnitStore,
    M: MembershipAuthority,
{
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        self.authorize(ctx, class_id).await?;
        let units = self.store.list_by_class(class_id).await?;
        Ok(units.iter().map(|u| *u.id()).collect())
    }

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        self.authorized_unit(ctx, unit_id).await
    }

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()> {
        self.authorize(ctx, class_id).await?;
        let unit = Unit::new(UnitId::new(), class_id, title);
        self.store.insert(unit).await?;
        Ok(())
    }

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()> {
        let mut unit = self.authorized_unit(ctx, unit_id).await?;
        unit.rename(title);
        self.store.update(unit).await?;
        Ok(())
    }

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()> {
        let unit = self.authorized_unit(ctx, unit_id).await?;
        self.store.delete(*unit.id()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use unitsvc_auth::{MembershipError, Principal, StaticMembership};
    use unitsvc_core::ServiceError;
    use unitsvc_infra::store::{InMemoryUnitStore, StoreError};

    use super::*;
    use crate::testing::ctx;

    fn fixture() -> (UnitCore<Arc<InMemoryUnitStore>, Arc<StaticMembership>>, Arc<InMemoryUnitStore>, Arc<StaticMembership>) {
        let store = Arc::new(InMemoryUnitStore::new());
        let membership = Arc::new(StaticMembership::new());
        (UnitCore::new(store.clone(), membership.clone()), store, membership)
    }

    #[tokio::test]
    async fn member_can_create_list_get_rename_delete() {
        let (core, _store, membership) = fixture();
        let alice = ctx();
        let class_id = ClassId::new();
        membership.enroll(alice.subject(), class_id);

        core.create_unit(&alice, class_id, "Lesson 1").await.unwrap();
        let ids = core.list_units(&alice, class_id).await.unwrap();
        assert_eq!(ids.len(), 1);

        let unit = core.get_unit(&alice, ids[0]).await.unwrap();
        assert_eq!(unit.class_id(), class_id);
        assert_eq!(unit.title(), "Lesson 1");

        core.rename_unit(&alice, ids[0], "Lesson 1b").await.unwrap();
        assert_eq!(core.get_unit(&alice, ids[0]).await.unwrap().title(), "Lesson 1b");

        core.delete_unit(&alice, ids[0]).await.unwrap();
        assert_eq!(core.get_unit(&alice, ids[0]).await.unwrap_err(), ServiceError::NotFound);
        assert!(core.list_units(&alice, class_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_units_look_missing() {
        let (core, store, membership) = fixture();
        let (alice, bob) = (ctx(), ctx());
        let class_id = ClassId::new();
        membership.enroll(alice.subject(), class_id);
        membership.enroll(bob.subject(), ClassId::new());

        let unit = Unit::new(UnitId::new(), class_id, "Lesson 1");
        store.insert(unit.clone()).await.unwrap();
        let id = *unit.id();

        assert_eq!(core.get_unit(&bob, id).await.unwrap_err(), ServiceError::NotFound);
        assert_eq!(core.rename_unit(&bob, id, "x").await.unwrap_err(), ServiceError::NotFound);
        assert_eq!(core.delete_unit(&bob, id).await.unwrap_err(), ServiceError::NotFound);
        assert_eq!(core.list_units(&bob, class_id).await.unwrap_err(), ServiceError::NotFound);
        assert_eq!(core.create_unit(&bob, class_id, "x").await.unwrap_err(), ServiceError::NotFound);

        // Nothing changed for the owner.
        assert_eq!(core.get_unit(&alice, id).await.unwrap(), unit);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (core, _store, membership) = fixture();
        let alice = ctx();
        membership.enroll(alice.subject(), ClassId::new());
        let id = UnitId::new();

        assert_eq!(core.get_unit(&alice, id).await.unwrap_err(), ServiceError::NotFound);
        assert_eq!(core.rename_unit(&alice, id, "x").await.unwrap_err(), ServiceError::NotFound);
        assert_eq!(core.delete_unit(&alice, id).await.unwrap_err(), ServiceError::NotFound);
    }

    #[tokio::test]
    async fn membership_is_fetched_fresh_on_every_call() {
        let (core, _store, membership) = fixture();
        let alice = ctx();
        let class_id = ClassId::new();
        membership.enroll(alice.subject(), class_id);
        core.create_unit(&alice, class_id, "Lesson 1").await.unwrap();
        let id = core.list_units(&alice, class_id).await.unwrap()[0];

        membership.withdraw(alice.subject(), class_id);
        assert_eq!(core.get_unit(&alice, id).await.unwrap_err(), ServiceError::NotFound);
    }

    struct FailingMembership(MembershipError);

    #[async_trait]
    impl MembershipAuthority for FailingMembership {
        async fn list_classes(&self, _principal: &Principal) -> Result<Vec<ClassId>, MembershipError> {
            Err(self.0.clone())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl UnitStore for BrokenStore {
        async fn get_by_id(&self, _id: UnitId) -> Result<Unit, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn list_by_class(&self, _class_id: ClassId) -> Result<Vec<Unit>, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn insert(&self, _unit: Unit) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn update(&self, _unit: Unit) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn delete(&self, _id: UnitId) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn collaborator_failures_surface_as_internal() {
        let core = UnitCore::new(
            InMemoryUnitStore::new(),
            FailingMembership(MembershipError::Internal("classsvc down".into())),
        );
        assert_eq!(
            core.list_units(&ctx(), ClassId::new()).await.unwrap_err(),
            ServiceError::Internal("classsvc down".into())
        );

        let core = UnitCore::new(InMemoryUnitStore::new(), FailingMembership(MembershipError::NotFound));
        assert_eq!(
            core.create_unit(&ctx(), ClassId::new(), "x").await.unwrap_err(),
            ServiceError::NotFound
        );

        let alice = ctx();
        let class_id = ClassId::new();
        let membership = StaticMembership::new();
        membership.enroll(alice.subject(), class_id);
        let core = UnitCore::new(BrokenStore, membership);
        assert_eq!(
            core.list_units(&alice, class_id).await.unwrap_err().kind(),
            unitsvc_core::ErrorKind::Internal
        );
        assert_eq!(
            core.get_unit(&alice, UnitId::new()).await.unwrap_err(),
            ServiceError::Internal("store backend error: connection reset".into())
        );
    }

    proptest! {
        #[test]
        fn non_members_never_reach_a_class(member_of in 0usize..4, target in 0usize..4) {
            let classes: Vec<ClassId> = (0..4).map(|_| ClassId::new()).collect();
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

            runtime.block_on(async {
                let (core, _store, membership) = fixture();
                let caller = ctx();
                membership.enroll(caller.subject(), classes[member_of]);

                let listed = core.list_units(&caller, classes[target]).await;
                let created = core.create_unit(&caller, classes[target], "t").await;

                if member_of == target {
                    prop_assert!(listed.is_ok());
                    prop_assert!(created.is_ok());
                } else {
                    prop_assert_eq!(listed.unwrap_err(), ServiceError::NotFound);
                    prop_assert_eq!(created.unwrap_err(), ServiceError::NotFound);
                }
                Ok(())
            })?;
        }
    }
}
