//! S3-compatible object storage module
//!
//! Slim path-style client for S3-compatible endpoints (MinIO in the
//! reference deployment):
//! - signature v2 authentication
//! - object put/get/head
//! - bucket creation at startup
//!
//! No external SDK; requests are signed and sent directly.

pub mod client;
pub mod provider;
pub mod signer;

pub use client::Client;
pub use provider::S3Store;
pub use signer::Signer;
