//! Explicit per-call context.
//!
//! Every service operation receives a `CallContext` as a parameter; nothing is
//! looked up from ambient request state.

use uuid::Uuid;

use crate::{Principal, SubjectId};

/// Correlation data for one call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TraceInfo {
    request_id: Uuid,
}

impl TraceInfo {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
        }
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Default for TraceInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Authenticated call context (principal + trace info).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    principal: Principal,
    trace: TraceInfo,
}

impl CallContext {
    pub fn new(principal: Principal, trace: TraceInfo) -> Self {
        Self { principal, trace }
    }

    pub fn for_principal(principal: Principal) -> Self {
        Self::new(principal, TraceInfo::new())
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn trace(&self) -> &TraceInfo {
        &self.trace
    }

    pub fn subject(&self) -> SubjectId {
        self.principal.subject
    }

    pub fn client_id(&self) -> &str {
        &self.principal.client_id
    }
}
