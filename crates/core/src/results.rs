//! Decoded service responses.
//!
//! Results are plain data. Optional fields the service omits decode to
//! `None` or empty collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conflict::{BatchDescribeMergeConflictsError, Conflict, ConflictMetadata, MergeHunk};
use crate::enums::MergeOption;
use crate::errors::ModelError;
use crate::models::{Approval, ApprovalRule, Comment, Commit, PullRequest, ReactionForComment};

/// Commit and tree produced by a branch merge or an unreferenced merge
/// commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBranchesResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMergeOptionsResult {
    #[serde(default)]
    pub merge_options: Vec<MergeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_commit_id: Option<String>,
}

impl GetMergeOptionsResult {
    pub fn supports(&self, option: MergeOption) -> bool {
        self.merge_options.contains(&option)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMergeCommitResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_commit_id: Option<String>,
    /// Absent when the two specifiers have not been merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_commit_id: Option<String>,
}

/// One page of conflicting files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMergeConflictsResult {
    #[serde(default)]
    pub mergeable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_commit_id: Option<String>,
    #[serde(default)]
    pub conflict_metadata_list: Vec<ConflictMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl GetMergeConflictsResult {
    /// Entries that break the conflict counting rules, with the reason.
    pub fn inconsistent_metadata(&self) -> Vec<(&ConflictMetadata, ModelError)> {
        self.conflict_metadata_list
            .iter()
            .filter_map(|m| m.check_consistency().err().map(|e| (m, e)))
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}

/// Hunks for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeMergeConflictsResult {
    #[serde(default)]
    pub conflict_metadata: ConflictMetadata,
    #[serde(default)]
    pub merge_hunks: Vec<MergeHunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_commit_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDescribeMergeConflictsResult {
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Files the service failed to describe; the rest of the batch is
    /// still returned.
    #[serde(default)]
    pub errors: Vec<BatchDescribeMergeConflictsError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_commit_id: Option<String>,
}

/// Shared by the three pull request merge operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePullRequestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestResult {
    #[serde(default)]
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePullRequestStatusResult {
    #[serde(default)]
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestApprovalRuleResult {
    #[serde(default)]
    pub approval_rule: ApprovalRule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentReplyResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestResult {
    #[serde(default)]
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestApprovalStatesResult {
    #[serde(default)]
    pub approvals: Vec<Approval>,
}

impl GetPullRequestApprovalStatesResult {
    /// ARNs of users currently approving the revision.
    pub fn approvers(&self) -> impl Iterator<Item = &str> {
        self.approvals
            .iter()
            .filter(|a| a.is_approved())
            .filter_map(|a| a.user_arn.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestOverrideStateResult {
    #[serde(default)]
    pub overridden: bool,
    /// Who set the rules aside, when they are overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrider: Option<String>,
}

/// Response of the operations that return no fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResult {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCommentReactionsResult {
    #[serde(default)]
    pub reactions_for_comment: Vec<ReactionForComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl GetCommentReactionsResult {
    /// Totals per reaction, keyed the same way as
    /// [`Comment::reaction_counts`]. Reactions with no usable key are
    /// skipped.
    pub fn reaction_counts(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for entry in &self.reactions_for_comment {
            let Some(key) = entry.reaction.as_ref().and_then(|r| r.key()) else {
                continue;
            };
            let total = entry.total();
            if total > 0 {
                let slot: &mut u32 = counts.entry(key.to_string()).or_default();
                *slot = slot.saturating_add(total);
            }
        }
        counts
    }

    /// Copy the counts onto a comment read earlier.
    pub fn apply_to(&self, comment: &mut Comment) {
        comment.reaction_counts = self.reaction_counts();
    }

    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCommitResult {
    #[serde(default)]
    pub commit: Commit,
}
