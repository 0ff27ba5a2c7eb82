//! Shared API types.

mod response;

pub use response::MessageResponse;
