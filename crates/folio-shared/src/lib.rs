//! # Folio Shared
//!
//! Wire types shared between the API server and its clients.
//! Kept free of domain dependencies so it also builds for WASM front-ends.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
