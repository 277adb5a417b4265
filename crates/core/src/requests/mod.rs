//! Outbound request envelopes.
//!
//! Requests are assembled through consuming builders. `build()` runs every
//! local check and returns either a complete, frozen request or a
//! [`ModelError`]; nothing is sent until the request is handed to a
//! [`CodeCommitClient`](crate::client::CodeCommitClient).

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validation;

/// Local checks a request must pass before it is sent.
///
/// Builders call this from `build()`. The client calls it again before
/// sending, which also covers requests obtained by deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), ModelError>;
}

// ---------------------------------------------------------------------------
// Shared builder setters
// ---------------------------------------------------------------------------

macro_rules! merge_sides_setters {
    () => {
        pub fn repository_name(mut self, name: impl Into<String>) -> Self {
            self.sides.repository_name = Some(name.into());
            self
        }

        /// Branch, tag, `HEAD` or full commit id to merge from.
        pub fn source_commit_specifier(mut self, specifier: impl Into<String>) -> Self {
            self.sides.source_commit_specifier = Some(specifier.into());
            self
        }

        /// Branch, tag, `HEAD` or full commit id to merge into.
        pub fn destination_commit_specifier(mut self, specifier: impl Into<String>) -> Self {
            self.sides.destination_commit_specifier = Some(specifier.into());
            self
        }
    };
}

macro_rules! policy_setters {
    () => {
        pub fn conflict_detail_level(mut self, level: $crate::enums::ConflictDetailLevel) -> Self {
            self.policy.conflict_detail_level = level;
            self
        }

        pub fn conflict_resolution_strategy(
            mut self,
            strategy: $crate::enums::ConflictResolutionStrategy,
        ) -> Self {
            self.policy.conflict_resolution_strategy = strategy;
            self
        }
    };
}

macro_rules! resolution_setter {
    () => {
        /// Only valid together with `AUTOMERGE`.
        pub fn conflict_resolution(
            mut self,
            resolution: $crate::conflict::ConflictResolution,
        ) -> Self {
            self.policy.conflict_resolution = Some(resolution);
            self
        }
    };
}

macro_rules! commit_details_setters {
    () => {
        pub fn author_name(mut self, name: impl Into<String>) -> Self {
            self.commit.author_name = Some(name.into());
            self
        }

        pub fn email(mut self, email: impl Into<String>) -> Self {
            self.commit.email = Some(email.into());
            self
        }

        pub fn commit_message(mut self, message: impl Into<String>) -> Self {
            self.commit.commit_message = Some(message.into());
            self
        }

        /// Keep folders left empty by the merge as `.gitkeep` entries.
        pub fn keep_empty_folders(mut self, keep: bool) -> Self {
            self.commit.keep_empty_folders = Some(keep);
            self
        }
    };
}

pub mod approval;
pub mod comment;
pub mod commit;
pub mod merge;
pub mod pull_request;

pub use approval::*;
pub use comment::{
    GetCommentReactionsRequest, GetCommentReactionsRequestBuilder, PostCommentReplyRequest,
    PostCommentReplyRequestBuilder,
};
pub use commit::{GetCommitRequest, GetCommitRequestBuilder};
pub use merge::*;
pub use pull_request::*;

// ---------------------------------------------------------------------------
// Shared request pieces
// ---------------------------------------------------------------------------

/// Repository plus the two commit specifiers being merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSides {
    repository_name: String,
    source_commit_specifier: String,
    destination_commit_specifier: String,
}

impl MergeSides {
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn source_commit_specifier(&self) -> &str {
        &self.source_commit_specifier
    }

    pub fn destination_commit_specifier(&self) -> &str {
        &self.destination_commit_specifier
    }
}

impl Validate for MergeSides {
    fn validate(&self) -> Result<(), ModelError> {
        validation::repository_name(&self.repository_name)?;
        validation::commit_specifier("sourceCommitSpecifier", &self.source_commit_specifier)?;
        validation::commit_specifier(
            "destinationCommitSpecifier",
            &self.destination_commit_specifier,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MergeSidesBuilder {
    pub(crate) repository_name: Option<String>,
    pub(crate) source_commit_specifier: Option<String>,
    pub(crate) destination_commit_specifier: Option<String>,
}

impl MergeSidesBuilder {
    pub(crate) fn build(self) -> Result<MergeSides, ModelError> {
        let sides = MergeSides {
            repository_name: required("repositoryName", self.repository_name)?,
            source_commit_specifier: required(
                "sourceCommitSpecifier",
                self.source_commit_specifier,
            )?,
            destination_commit_specifier: required(
                "destinationCommitSpecifier",
                self.destination_commit_specifier,
            )?,
        };
        sides.validate()?;
        Ok(sides)
    }
}

/// Author identity, message and folder handling for a commit the service
/// creates on the caller's behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) commit_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) keep_empty_folders: Option<bool>,
}

impl CommitDetails {
    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn commit_message(&self) -> Option<&str> {
        self.commit_message.as_deref()
    }

    /// Defaults to `false` when unset.
    pub fn keep_empty_folders(&self) -> bool {
        self.keep_empty_folders.unwrap_or(false)
    }
}

impl Validate for CommitDetails {
    fn validate(&self) -> Result<(), ModelError> {
        if let Some(ref name) = self.author_name {
            validation::author_name(name)?;
        }
        if let Some(ref email) = self.email {
            validation::email(email)?;
        }
        if let Some(ref message) = self.commit_message {
            validation::commit_message(message)?;
        }
        Ok(())
    }
}

/// Unwrap a required builder field.
pub(crate) fn required(field: &str, value: Option<String>) -> Result<String, ModelError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ModelError::validation(field, "required", "")),
    }
}

/// A fresh idempotency token for calls that create resources.
pub(crate) fn generate_client_request_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_require_every_field() {
        let err = MergeSidesBuilder {
            repository_name: Some("demo".into()),
            source_commit_specifier: None,
            destination_commit_specifier: Some("main".into()),
        }
        .build()
        .unwrap_err();
        assert_eq!(err.field(), Some("sourceCommitSpecifier"));

        let err = MergeSidesBuilder::default().build().unwrap_err();
        assert_eq!(err.field(), Some("repositoryName"));
    }

    #[test]
    fn test_commit_details_checks_present_fields_only() {
        assert!(CommitDetails::default().validate().is_ok());

        let details = CommitDetails {
            email: Some("not-an-address".into()),
            ..Default::default()
        };
        assert_eq!(details.validate().unwrap_err().field(), Some("email"));
        assert!(!details.keep_empty_folders());
    }

    #[test]
    fn test_generated_tokens_are_unique_and_valid() {
        let a = generate_client_request_token();
        let b = generate_client_request_token();
        assert_ne!(a, b);
        assert!(validation::client_request_token(&a).is_ok());
    }
}
