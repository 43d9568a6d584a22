//! Observability module - request correlation.

mod request_id;

pub use request_id::{RequestId, request_id};
