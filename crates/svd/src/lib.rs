//! Client for the Stable Video Diffusion inference endpoint.
//!
//! [`client::SvdClient`] performs a single image-to-video request and
//! classifies the response; [`retry::fetch_with_retry`] turns that
//! unreliable, slow, rate-limited call into a bounded retry loop with
//! backoff.

pub mod client;
pub mod retry;

pub use client::{FetchError, GenerationParams, SvdClient};
pub use retry::{fetch_with_retry, RetryConfig};
