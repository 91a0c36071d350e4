//! `unitsvc-client`: talk to a remote unit service as if it were local.
//!
//! [`HttpUnitClient`] implements [`unitsvc_service::UnitService`] over the
//! HTTP API, forwarding the bearer credential carried by each call's
//! [`CallContext`](unitsvc_auth::CallContext).

mod http;

pub use http::{ClientError, HttpUnitClient};
