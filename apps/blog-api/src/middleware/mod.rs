//! Request extractors, error mapping and request timing.

pub mod auth;
pub mod error;
pub mod timing;
