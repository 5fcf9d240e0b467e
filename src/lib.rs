//! Scribe - handwriting evaluation gateway
//!
//! Sends a character label and an image to a multimodal model and returns
//! a normalized `{score, feedback}` result. Requests are spread over a pool
//! of interchangeable API credentials; a throttled credential is skipped in
//! favor of the next one until the pool is exhausted.

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod evaluation;
pub mod extract;
pub mod logging;
pub mod metrics;
pub mod pool;
pub mod upstream;
