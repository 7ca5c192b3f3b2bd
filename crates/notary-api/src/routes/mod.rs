//! # API Route Modules
//!
//! - `notarize`: upload and verify, the two notarization workflows.
//! - `users`: account registration and per-user transaction listing.
//! - `ledger`: direct hash submission and event lookup on the contract.
//! - `admin`: bulk index reset and counters, behind the admin token.

pub mod admin;
pub mod ledger;
pub mod notarize;
pub mod users;
