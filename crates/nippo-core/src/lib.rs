//! nippo-core
//!
//! Pure domain types, worked-time arithmetic, approval-policy resolution,
//! and storage key conventions. No AWS SDK dependency — this is the shared
//! vocabulary of the nippo system.

pub mod dates;
pub mod keys;
pub mod models;
pub mod policy;
pub mod time;
