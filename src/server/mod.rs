//! Axum-based HTTP front for the cache worker.
//!
//! Every request that is not a control endpoint falls through to the proxy
//! handler, which is the worker's fetch-interception point. Control
//! endpoints: `/health`, `/metrics`, and `/worker/message` (the message
//! protocol).

mod handlers;
mod routes;

pub use routes::{create_router, AppState};
