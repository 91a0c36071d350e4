//! `unitsvc-core`: domain building blocks for the unit service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the `Unit` entity and the service-level error taxonomy.

pub mod entity;
pub mod error;
pub mod id;
pub mod unit;

pub use entity::Entity;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use id::{ClassId, UnitId};
pub use unit::Unit;
