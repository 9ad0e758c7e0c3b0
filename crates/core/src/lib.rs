//! Domain types for the character video generation service.
//!
//! Holds the job model and its status state machine, the injectable job
//! store abstraction (with the default in-memory backend), filename and
//! locator conventions, and the placeholder artifact used when no
//! inference credential is configured. No HTTP or network code lives
//! here.

pub mod error;
pub mod fallback;
pub mod job;
pub mod naming;
pub mod store;
