//! Shared utilities.

pub mod emails;
