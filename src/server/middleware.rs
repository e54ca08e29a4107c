//! Request middleware for intercepting broker traffic.
//!
//! Middlewares see every parseable request before the broker does and may
//! answer it themselves, which is how tests inject faults (wrong leaders,
//! retriable errors, dropped brokers) without touching broker state.

use bytes::Bytes;

use super::request::ApiKey;
use super::response::Response;

/// Intercepts requests before they reach the broker.
///
/// `attempt` returns `Some(response)` to answer the request itself, or
/// `None` to pass it along. Middlewares are consulted in registration
/// order and the first `Some` wins.
pub trait Middleware: Send + Sync {
    fn attempt(&self, node_id: i32, api_key: ApiKey, request: &Bytes) -> Option<Response>;
}

impl<F> Middleware for F
where
    F: Fn(i32, ApiKey, &Bytes) -> Option<Response> + Send + Sync,
{
    fn attempt(&self, node_id: i32, api_key: ApiKey, request: &Bytes) -> Option<Response> {
        self(node_id, api_key, request)
    }
}

/// Run the chain, stopping at the first middleware that answers.
pub(crate) fn run_chain(
    middlewares: &[Box<dyn Middleware>],
    node_id: i32,
    api_key: ApiKey,
    request: &Bytes,
) -> Option<Response> {
    middlewares
        .iter()
        .find_map(|m| m.attempt(node_id, api_key, request))
}
