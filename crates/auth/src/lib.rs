//! `unitsvc-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines the
//! contracts of the two external authorities (token introspection and class
//! membership), the per-call `CallContext`, and the pure class-membership rule.

pub mod authorize;
pub mod context;
pub mod introspection;
pub mod membership;
pub mod principal;
pub mod scopes;

pub use authorize::{AuthzError, ClassMembership, authorize_class};
pub use context::{CallContext, TraceInfo};
pub use introspection::{
    Introspection, IntrospectionError, Introspector, StaticIntrospector, check_principal,
    validate_introspection,
};
pub use membership::{MembershipAuthority, MembershipError, StaticMembership};
pub use principal::{BearerToken, Principal, SubjectId};
pub use scopes::Scope;
