//! `unitsvc-service`: the unit service and its decorator chain.
//!
//! Calls flow `Logging → Instrumenting → Notifying → UnitCore`; every layer
//! implements [`UnitService`] and owns the next one.

pub mod instrumenting;
pub mod logging;
pub mod notifying;
pub mod pipeline;
pub mod service;
pub mod unit_core;

#[cfg(test)]
pub(crate) mod testing;

pub use instrumenting::{Instrumenting, RequestMetrics};
pub use logging::Logging;
pub use notifying::Notifying;
pub use pipeline::{UnitPipeline, build_pipeline};
pub use service::{Method, UnitService};
pub use unit_core::UnitCore;
