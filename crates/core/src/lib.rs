//! CodeCommit merge model core library.
//!
//! This crate provides the typed vocabulary and envelopes for CodeCommit's
//! merge, conflict and pull request operations: closed wire enums,
//! validated request builders, decoded results, conflict metadata and
//! resolution payloads, configuration, and an async client over a
//! pluggable transport.

pub mod client;
pub mod config;
pub mod conflict;
pub mod enums;
pub mod errors;
pub mod models;
pub mod requests;
pub mod results;
pub mod validation;

// Re-exports for convenience.
pub use client::{CodeCommitClient, HttpTransport, Operation, Transport};
pub use config::ClientConfig;
pub use conflict::{ConflictMetadata, ConflictResolution, MergePolicy};
pub use enums::{ConflictDetailLevel, ConflictResolutionStrategy, MergeOption, PullRequestStatus};
pub use errors::{CoreError, ModelError, ServiceError};
pub use requests::Validate;
