//! Branch merge and merge-inspection requests.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::{require_merge_commit, MergePolicy};
use crate::enums::MergeOption;
use crate::errors::ModelError;
use crate::requests::{CommitDetails, MergeSides, MergeSidesBuilder, Validate};
use crate::validation;

fn validate_target_branch(target_branch: Option<&str>) -> Result<(), ModelError> {
    match target_branch {
        Some(branch) => validation::branch_name("targetBranch", branch),
        None => Ok(()),
    }
}

fn validate_page_size(field: &str, value: Option<i32>) -> Result<(), ModelError> {
    match value {
        Some(v) => validation::page_size(field, v),
        None => Ok(()),
    }
}

fn require_merge_option(option: Option<MergeOption>) -> Result<MergeOption, ModelError> {
    option.ok_or_else(|| ModelError::validation("mergeOption", "required", ""))
}

// ---------------------------------------------------------------------------
// MergeBranchesByFastForward
// ---------------------------------------------------------------------------

/// Fast-forward the destination to the source. No merge commit is created,
/// so there is no conflict policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBranchesByFastForwardRequest {
    #[serde(flatten)]
    sides: MergeSides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_branch: Option<String>,
}

impl MergeBranchesByFastForwardRequest {
    pub fn builder() -> MergeBranchesByFastForwardRequestBuilder {
        MergeBranchesByFastForwardRequestBuilder::default()
    }

    pub fn sides(&self) -> &MergeSides {
        &self.sides
    }

    pub fn target_branch(&self) -> Option<&str> {
        self.target_branch.as_deref()
    }
}

impl Validate for MergeBranchesByFastForwardRequest {
    fn validate(&self) -> Result<(), ModelError> {
        self.sides.validate()?;
        validate_target_branch(self.target_branch.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct MergeBranchesByFastForwardRequestBuilder {
    sides: MergeSidesBuilder,
    target_branch: Option<String>,
}

impl MergeBranchesByFastForwardRequestBuilder {
    merge_sides_setters!();

    /// Branch to update. Defaults to the destination when it is a branch.
    pub fn target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }

    pub fn build(self) -> Result<MergeBranchesByFastForwardRequest, ModelError> {
        let request = MergeBranchesByFastForwardRequest {
            sides: self.sides.build()?,
            target_branch: self.target_branch,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// MergeBranchesBySquash / MergeBranchesByThreeWay
// ---------------------------------------------------------------------------

/// Merge two branches into one squashed commit on the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBranchesBySquashRequest {
    #[serde(flatten)]
    sides: MergeSides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_branch: Option<String>,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(flatten)]
    commit: CommitDetails,
}

/// Merge two branches with a three-way merge commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBranchesByThreeWayRequest {
    #[serde(flatten)]
    sides: MergeSides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_branch: Option<String>,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(flatten)]
    commit: CommitDetails,
}

macro_rules! merge_branches_request {
    ($request:ident, $builder:ident) => {
        impl $request {
            pub fn builder() -> $builder {
                $builder::default()
            }

            pub fn sides(&self) -> &MergeSides {
                &self.sides
            }

            pub fn target_branch(&self) -> Option<&str> {
                self.target_branch.as_deref()
            }

            pub fn policy(&self) -> &MergePolicy {
                &self.policy
            }

            pub fn commit_details(&self) -> &CommitDetails {
                &self.commit
            }
        }

        impl Validate for $request {
            fn validate(&self) -> Result<(), ModelError> {
                self.sides.validate()?;
                validate_target_branch(self.target_branch.as_deref())?;
                self.policy.validate()?;
                self.commit.validate()
            }
        }

        #[derive(Debug, Clone, Default)]
        #[must_use]
        pub struct $builder {
            sides: MergeSidesBuilder,
            target_branch: Option<String>,
            policy: MergePolicy,
            commit: CommitDetails,
        }

        impl $builder {
            merge_sides_setters!();
            policy_setters!();
            resolution_setter!();
            commit_details_setters!();

            pub fn target_branch(mut self, branch: impl Into<String>) -> Self {
                self.target_branch = Some(branch.into());
                self
            }

            pub fn build(self) -> Result<$request, ModelError> {
                let request = $request {
                    sides: self.sides.build()?,
                    target_branch: self.target_branch,
                    policy: self.policy,
                    commit: self.commit,
                };
                request.validate()?;
                debug!(
                    request = stringify!($request),
                    repository = request.sides.repository_name(),
                    "built merge request"
                );
                Ok(request)
            }
        }
    };
}

merge_branches_request!(MergeBranchesBySquashRequest, MergeBranchesBySquashRequestBuilder);
merge_branches_request!(MergeBranchesByThreeWayRequest, MergeBranchesByThreeWayRequestBuilder);

// ---------------------------------------------------------------------------
// CreateUnreferencedMergeCommit
// ---------------------------------------------------------------------------

/// Produce a merge commit that no branch points at, to preview a merge.
/// Fast-forward is rejected because it produces no commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnreferencedMergeCommitRequest {
    #[serde(flatten)]
    sides: MergeSides,
    merge_option: MergeOption,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(flatten)]
    commit: CommitDetails,
}

impl CreateUnreferencedMergeCommitRequest {
    pub fn builder() -> CreateUnreferencedMergeCommitRequestBuilder {
        CreateUnreferencedMergeCommitRequestBuilder::default()
    }

    pub fn sides(&self) -> &MergeSides {
        &self.sides
    }

    pub fn merge_option(&self) -> MergeOption {
        self.merge_option
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    pub fn commit_details(&self) -> &CommitDetails {
        &self.commit
    }
}

impl Validate for CreateUnreferencedMergeCommitRequest {
    fn validate(&self) -> Result<(), ModelError> {
        self.sides.validate()?;
        require_merge_commit(self.merge_option, "CreateUnreferencedMergeCommit")?;
        self.policy.validate()?;
        self.commit.validate()
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct CreateUnreferencedMergeCommitRequestBuilder {
    sides: MergeSidesBuilder,
    merge_option: Option<MergeOption>,
    policy: MergePolicy,
    commit: CommitDetails,
}

impl CreateUnreferencedMergeCommitRequestBuilder {
    merge_sides_setters!();
    policy_setters!();
    resolution_setter!();
    commit_details_setters!();

    pub fn merge_option(mut self, option: MergeOption) -> Self {
        self.merge_option = Some(option);
        self
    }

    pub fn build(self) -> Result<CreateUnreferencedMergeCommitRequest, ModelError> {
        let request = CreateUnreferencedMergeCommitRequest {
            sides: self.sides.build()?,
            merge_option: require_merge_option(self.merge_option)?,
            policy: self.policy,
            commit: self.commit,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// GetMergeOptions / GetMergeCommit
// ---------------------------------------------------------------------------

/// Ask which merge options are available between two specifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMergeOptionsRequest {
    #[serde(flatten)]
    sides: MergeSides,
    #[serde(flatten)]
    policy: MergePolicy,
}

/// Look up the merge commit, if any, between two specifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMergeCommitRequest {
    #[serde(flatten)]
    sides: MergeSides,
    #[serde(flatten)]
    policy: MergePolicy,
}

macro_rules! merge_query_request {
    ($request:ident, $builder:ident) => {
        impl $request {
            pub fn builder() -> $builder {
                $builder::default()
            }

            pub fn sides(&self) -> &MergeSides {
                &self.sides
            }

            pub fn policy(&self) -> &MergePolicy {
                &self.policy
            }
        }

        impl Validate for $request {
            fn validate(&self) -> Result<(), ModelError> {
                self.sides.validate()?;
                self.policy.validate()
            }
        }

        #[derive(Debug, Clone, Default)]
        #[must_use]
        pub struct $builder {
            sides: MergeSidesBuilder,
            policy: MergePolicy,
        }

        impl $builder {
            merge_sides_setters!();
            policy_setters!();

            pub fn build(self) -> Result<$request, ModelError> {
                let request = $request {
                    sides: self.sides.build()?,
                    policy: self.policy,
                };
                request.validate()?;
                Ok(request)
            }
        }
    };
}

merge_query_request!(GetMergeOptionsRequest, GetMergeOptionsRequestBuilder);
merge_query_request!(GetMergeCommitRequest, GetMergeCommitRequestBuilder);

// ---------------------------------------------------------------------------
// GetMergeConflicts
// ---------------------------------------------------------------------------

/// List the files that conflict when merging two specifiers. Paged with
/// `nextToken`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMergeConflictsRequest {
    #[serde(flatten)]
    sides: MergeSides,
    merge_option: MergeOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_conflict_files: Option<i32>,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

impl GetMergeConflictsRequest {
    pub fn builder() -> GetMergeConflictsRequestBuilder {
        GetMergeConflictsRequestBuilder::default()
    }

    pub fn sides(&self) -> &MergeSides {
        &self.sides
    }

    pub fn merge_option(&self) -> MergeOption {
        self.merge_option
    }

    pub fn max_conflict_files(&self) -> Option<i32> {
        self.max_conflict_files
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    /// The same request positioned at another page.
    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

impl Validate for GetMergeConflictsRequest {
    fn validate(&self) -> Result<(), ModelError> {
        self.sides.validate()?;
        validate_page_size("maxConflictFiles", self.max_conflict_files)?;
        self.policy.validate()
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct GetMergeConflictsRequestBuilder {
    sides: MergeSidesBuilder,
    merge_option: Option<MergeOption>,
    max_conflict_files: Option<i32>,
    policy: MergePolicy,
    next_token: Option<String>,
}

impl GetMergeConflictsRequestBuilder {
    merge_sides_setters!();
    policy_setters!();

    pub fn merge_option(mut self, option: MergeOption) -> Self {
        self.merge_option = Some(option);
        self
    }

    pub fn max_conflict_files(mut self, max: i32) -> Self {
        self.max_conflict_files = Some(max);
        self
    }

    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<GetMergeConflictsRequest, ModelError> {
        let request = GetMergeConflictsRequest {
            sides: self.sides.build()?,
            merge_option: require_merge_option(self.merge_option)?,
            max_conflict_files: self.max_conflict_files,
            policy: self.policy,
            next_token: self.next_token,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// DescribeMergeConflicts
// ---------------------------------------------------------------------------

/// Hunk-level detail for one conflicting file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeMergeConflictsRequest {
    #[serde(flatten)]
    sides: MergeSides,
    merge_option: MergeOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_merge_hunks: Option<i32>,
    file_path: String,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

impl DescribeMergeConflictsRequest {
    pub fn builder() -> DescribeMergeConflictsRequestBuilder {
        DescribeMergeConflictsRequestBuilder::default()
    }

    pub fn sides(&self) -> &MergeSides {
        &self.sides
    }

    pub fn merge_option(&self) -> MergeOption {
        self.merge_option
    }

    pub fn max_merge_hunks(&self) -> Option<i32> {
        self.max_merge_hunks
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

impl Validate for DescribeMergeConflictsRequest {
    fn validate(&self) -> Result<(), ModelError> {
        self.sides.validate()?;
        require_merge_commit(self.merge_option, "DescribeMergeConflicts")?;
        validate_page_size("maxMergeHunks", self.max_merge_hunks)?;
        validation::file_path("filePath", &self.file_path)?;
        self.policy.validate()
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct DescribeMergeConflictsRequestBuilder {
    sides: MergeSidesBuilder,
    merge_option: Option<MergeOption>,
    max_merge_hunks: Option<i32>,
    file_path: Option<String>,
    policy: MergePolicy,
    next_token: Option<String>,
}

impl DescribeMergeConflictsRequestBuilder {
    merge_sides_setters!();
    policy_setters!();

    pub fn merge_option(mut self, option: MergeOption) -> Self {
        self.merge_option = Some(option);
        self
    }

    pub fn max_merge_hunks(mut self, max: i32) -> Self {
        self.max_merge_hunks = Some(max);
        self
    }

    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<DescribeMergeConflictsRequest, ModelError> {
        let request = DescribeMergeConflictsRequest {
            sides: self.sides.build()?,
            merge_option: require_merge_option(self.merge_option)?,
            max_merge_hunks: self.max_merge_hunks,
            file_path: super::required("filePath", self.file_path)?,
            policy: self.policy,
            next_token: self.next_token,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// BatchDescribeMergeConflicts
// ---------------------------------------------------------------------------

/// Hunk-level detail for several conflicting files at once. An empty
/// `filePaths` list describes every conflicting file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDescribeMergeConflictsRequest {
    #[serde(flatten)]
    sides: MergeSides,
    merge_option: MergeOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_merge_hunks: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_conflict_files: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    file_paths: Vec<String>,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

impl BatchDescribeMergeConflictsRequest {
    pub fn builder() -> BatchDescribeMergeConflictsRequestBuilder {
        BatchDescribeMergeConflictsRequestBuilder::default()
    }

    pub fn sides(&self) -> &MergeSides {
        &self.sides
    }

    pub fn merge_option(&self) -> MergeOption {
        self.merge_option
    }

    pub fn max_merge_hunks(&self) -> Option<i32> {
        self.max_merge_hunks
    }

    pub fn max_conflict_files(&self) -> Option<i32> {
        self.max_conflict_files
    }

    pub fn file_paths(&self) -> &[String] {
        &self.file_paths
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

impl Validate for BatchDescribeMergeConflictsRequest {
    fn validate(&self) -> Result<(), ModelError> {
        self.sides.validate()?;
        require_merge_commit(self.merge_option, "BatchDescribeMergeConflicts")?;
        validate_page_size("maxMergeHunks", self.max_merge_hunks)?;
        validate_page_size("maxConflictFiles", self.max_conflict_files)?;
        for path in &self.file_paths {
            validation::file_path("filePaths", path)?;
        }
        self.policy.validate()
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct BatchDescribeMergeConflictsRequestBuilder {
    sides: MergeSidesBuilder,
    merge_option: Option<MergeOption>,
    max_merge_hunks: Option<i32>,
    max_conflict_files: Option<i32>,
    file_paths: Vec<String>,
    policy: MergePolicy,
    next_token: Option<String>,
}

impl BatchDescribeMergeConflictsRequestBuilder {
    merge_sides_setters!();
    policy_setters!();

    pub fn merge_option(mut self, option: MergeOption) -> Self {
        self.merge_option = Some(option);
        self
    }

    pub fn max_merge_hunks(mut self, max: i32) -> Self {
        self.max_merge_hunks = Some(max);
        self
    }

    pub fn max_conflict_files(mut self, max: i32) -> Self {
        self.max_conflict_files = Some(max);
        self
    }

    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<BatchDescribeMergeConflictsRequest, ModelError> {
        let request = BatchDescribeMergeConflictsRequest {
            sides: self.sides.build()?,
            merge_option: require_merge_option(self.merge_option)?,
            max_merge_hunks: self.max_merge_hunks,
            max_conflict_files: self.max_conflict_files,
            file_paths: self.file_paths,
            policy: self.policy,
            next_token: self.next_token,
        };
        request.validate()?;
        Ok(request)
    }
}
