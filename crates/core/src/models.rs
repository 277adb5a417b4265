//! Value objects exchanged with the CodeCommit service.
//!
//! These are point-in-time copies of service-owned state. They are decoded
//! from responses and never mutated by the service after the fact, so
//! callers must tolerate staleness.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::enums::{ApprovalState, MergeOption, PullRequestStatus};

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Serde adapter for the service's epoch-seconds timestamps, which may be
/// fractional.
pub(crate) mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_f64(dt.timestamp_millis() as f64 / 1000.0),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let secs: Option<f64> = Option::deserialize(deserializer)?;
        secs.map(|s| {
            let millis = (s * 1000.0).round() as i64;
            DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", s)))
        })
        .transpose()
    }
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// Author or committer identity attached to a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Git-style date, e.g. `1484167798 -0800`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// An immutable commit, referenced by id once created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<String>,
}

impl Commit {
    /// A commit with more than one parent was produced by a merge.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// A commit without parents starts a history.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// Merge state of one pull request target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeMetadata {
    #[serde(default)]
    pub is_merged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_option: Option<MergeOption>,
}

/// A source/destination branch pair a pull request proposes to merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_metadata: Option<MergeMetadata>,
}

/// The template an approval rule was created from, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginApprovalRuleTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_rule_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_rule_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_content_sha256: Option<String>,
    #[serde(
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_approval_rule_template: Option<OriginApprovalRuleTemplate>,
}

/// Hex SHA-256 of approval rule content, as the service reports it in
/// `ruleContentSha256`.
pub fn rule_content_sha256(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

impl ApprovalRule {
    /// Whether the reported digest matches the reported content. Returns
    /// `None` when either side is missing.
    pub fn content_digest_matches(&self) -> Option<bool> {
        let content = self.approval_rule_content.as_deref()?;
        let digest = self.rule_content_sha256.as_deref()?;
        Some(rule_content_sha256(content).eq_ignore_ascii_case(digest))
    }
}

/// One user's vote on a pull request revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_state: Option<ApprovalState>,
}

impl Approval {
    pub fn is_approved(&self) -> bool {
        self.approval_state == Some(ApprovalState::Approve)
    }
}

/// A pull request as last seen by the client.
///
/// Only the status and the approval rules change over a pull request's
/// life. Status moves from `OPEN` to `CLOSED` once, driven by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_activity_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_status: Option<PullRequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_arn: Option<String>,
    #[serde(default)]
    pub pull_request_targets: Vec<PullRequestTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    #[serde(default)]
    pub approval_rules: Vec<ApprovalRule>,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.pull_request_status == Some(PullRequestStatus::Open)
    }

    /// True once every target reports a merge.
    pub fn is_fully_merged(&self) -> bool {
        !self.pull_request_targets.is_empty()
            && self.pull_request_targets.iter().all(|t| {
                t.merge_metadata
                    .as_ref()
                    .map(|m| m.is_merged)
                    .unwrap_or(false)
            })
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// A comment in a reply tree.
///
/// `in_reply_to` names the parent comment by id; it is a reference, not
/// ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    #[serde(
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_arn: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
    #[serde(default)]
    pub caller_reactions: Vec<String>,
    /// Emoji identifier to count. Keys are unique; counts never go negative.
    #[serde(default)]
    pub reaction_counts: BTreeMap<String, u32>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some()
    }

    /// Adjust the count for one reaction by `delta`. Counts saturate at
    /// zero and reactions that reach zero are dropped from the map.
    pub fn adjust_reaction(&mut self, reaction: &str, delta: i64) {
        let current = i64::from(self.reaction_counts.get(reaction).copied().unwrap_or(0));
        let next = (current + delta).clamp(0, i64::from(u32::MAX));
        if next == 0 {
            self.reaction_counts.remove(reaction);
        } else {
            self.reaction_counts.insert(reaction.to_string(), next as u32);
        }
    }

    /// Mark the comment deleted. The service keeps the node so replies stay
    /// attached, but drops its content.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
        self.content = None;
    }
}

/// The ways one reaction can be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionValueFormats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unicode: Option<String>,
}

impl ReactionValueFormats {
    /// Key used in [`Comment::reaction_counts`].
    pub fn key(&self) -> Option<&str> {
        self.short_code.as_deref().or(self.emoji.as_deref())
    }
}

/// Everyone who left one reaction on a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionForComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionValueFormats>,
    #[serde(default)]
    pub reaction_users: Vec<String>,
    /// Deleted users are counted but not listed.
    #[serde(default)]
    pub reactions_from_deleted_users_count: u32,
}

impl ReactionForComment {
    pub fn total(&self) -> u32 {
        u32::try_from(self.reaction_users.len())
            .unwrap_or(u32::MAX)
            .saturating_add(self.reactions_from_deleted_users_count)
    }
}

/// Direct replies to `parent_id`, in the order given.
pub fn replies_to<'a>(
    comments: &'a [Comment],
    parent_id: &'a str,
) -> impl Iterator<Item = &'a Comment> + 'a {
    comments
        .iter()
        .filter(move |c| c.in_reply_to.as_deref() == Some(parent_id))
}
