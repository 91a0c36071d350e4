//! HTTP API: routing, authentication middleware, and request/response mapping.

pub mod app;
pub mod middleware;
