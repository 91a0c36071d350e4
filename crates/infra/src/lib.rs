//! Infrastructure layer: unit storage, event sinks, collaborator clients, config.

pub mod config;
pub mod db;
pub mod event_bus;
pub mod external;
pub mod store;
