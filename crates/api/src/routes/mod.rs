//! Route registration.

pub mod health;
