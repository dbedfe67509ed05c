//! Secret handling utilities.
//!
//! Re-exports the secrecy types used for the connection string so callers
//! don't need a direct dependency on secrecy.

pub use secrecy::{ExposeSecret, SecretString};
