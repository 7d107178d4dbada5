//! HTTP API for the social graph analyzer

pub mod handlers;
pub mod query;
pub mod routes;

pub use query::*;
pub use routes::create_router;
