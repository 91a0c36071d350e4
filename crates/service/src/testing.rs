//! Test doubles shared by the decorator tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use unitsvc_auth::{BearerToken, CallContext, Principal, Scope, SubjectId};
use unitsvc_core::{ClassId, ServiceError, ServiceResult, Unit, UnitId};

use crate::service::UnitService;

pub(crate) fn ctx() -> CallContext {
    let principal = Principal::new(
        SubjectId::new(),
        "web",
        Utc::now() + Duration::hours(1),
        vec![Scope::UNITS_LIST, Scope::UNITS_GET],
    )
    .with_credential(BearerToken::new("test-token"));
    CallContext::for_principal(principal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behaviour {
    Succeed,
    Fail,
    Hang,
    Panic,
}

/// Inner service that answers every call the same way.
#[derive(Debug)]
pub(crate) struct Stub {
    behaviour: Behaviour,
    error: ServiceError,
    calls: AtomicUsize,
}

impl Stub {
    pub(crate) fn new(behaviour: Behaviour) -> Self {
        Self::failing_with(behaviour, ServiceError::NotFound)
    }

    pub(crate) fn failing_with(behaviour: Behaviour, error: ServiceError) -> Self {
        Self {
            behaviour,
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T>(&self, value: T) -> ServiceResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => Ok(value),
            Behaviour::Fail => Err(self.error.clone()),
            Behaviour::Hang => std::future::pending().await,
            Behaviour::Panic => panic!("inner service panicked"),
        }
    }
}

#[async_trait]
impl UnitService for Stub {
    async fn list_units(&self, _ctx: &CallContext, _class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        self.respond(vec![UnitId::new()]).await
    }

    async fn get_unit(&self, _ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        self.respond(Unit::new(unit_id, ClassId::new(), "stub")).await
    }

    async fn create_unit(&self, _ctx: &CallContext, _class_id: ClassId, _title: &str) -> ServiceResult<()> {
        self.respond(()).await
    }

    async fn rename_unit(&self, _ctx: &CallContext, _unit_id: UnitId, _title: &str) -> ServiceResult<()> {
        self.respond(()).await
    }

    async fn delete_unit(&self, _ctx: &CallContext, _unit_id: UnitId) -> ServiceResult<()> {
        self.respond(()).await
    }
}
