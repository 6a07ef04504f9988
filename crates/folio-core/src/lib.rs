//! # Folio Core
//!
//! The domain layer of the Folio content service: the post review state
//! machine, the access policy, anonymous like fingerprints, and the ports
//! infrastructure must implement. No infrastructure dependencies live here.

pub mod access;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod ports;
pub mod services;

pub use access::{AccessPolicy, Session};
pub use error::DomainError;
