//! Unit persistence boundary.
//!
//! `UnitStore` is the storage contract the service core is written against;
//! `InMemoryUnitStore` backs tests and dev mode, `PostgresUnitStore` backs
//! production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryUnitStore;
pub use postgres::PostgresUnitStore;
pub use r#trait::{StoreError, UnitStore};
