//! Tower middleware applied to the API router.

pub mod cors;
pub mod metrics;
