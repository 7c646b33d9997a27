//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, 5xx capture)
//! 2. `TraceLayer` (one `http_request` span per request)
//! 3. Request ID (records `request_id` on that span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
