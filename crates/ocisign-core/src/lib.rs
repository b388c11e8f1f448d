//! Core types and configuration for ocisign.
//!
//! This crate holds the pieces shared between the signing library and the
//! function entry point: environment-driven configuration, the OCI region
//! type with its Object Storage endpoint, and the core error type.

mod config;
mod error;
mod types;

pub use config::OciSignConfig;
pub use error::{OciSignError, OciSignResult};
pub use types::Region;
