//! Typed async client over a pluggable [`Transport`].
//!
//! Every request envelope implements [`Operation`], which names the wire
//! operation and its result type. [`CodeCommitClient`] validates the
//! envelope, serializes it, hands it to the transport, and decodes the
//! response. Only idempotent operations are retried.

pub mod http;
pub mod retry;

use std::collections::HashSet;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::conflict::{Conflict, ConflictMetadata, MergeHunk};
use crate::config::ClientConfig;
use crate::errors::{CoreError, ServiceError};
use crate::requests::*;
use crate::results::*;

pub use http::{HttpTransport, RequestSigner};
pub use retry::RetryPolicy;

/// Carries one serialized request to the service and returns the raw
/// response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `operation` is the bare operation name, e.g. `GetMergeConflicts`.
    async fn invoke(&self, operation: &str, body: Value) -> Result<Value, ServiceError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn invoke(&self, operation: &str, body: Value) -> Result<Value, ServiceError> {
        (**self).invoke(operation, body).await
    }
}

/// A request envelope the client knows how to send.
pub trait Operation: Serialize + Validate + Sync {
    type Output: DeserializeOwned;

    /// Wire operation name.
    const NAME: &'static str;

    /// Safe to resend: reads, and writes protected by a client request
    /// token.
    const IDEMPOTENT: bool;
}

macro_rules! operation {
    ($request:ty => $output:ty, $name:literal, idempotent = $idempotent:literal) => {
        impl Operation for $request {
            type Output = $output;
            const NAME: &'static str = $name;
            const IDEMPOTENT: bool = $idempotent;
        }
    };
}

operation!(MergeBranchesByFastForwardRequest => MergeBranchesResult, "MergeBranchesByFastForward", idempotent = false);
operation!(MergeBranchesBySquashRequest => MergeBranchesResult, "MergeBranchesBySquash", idempotent = false);
operation!(MergeBranchesByThreeWayRequest => MergeBranchesResult, "MergeBranchesByThreeWay", idempotent = false);
operation!(CreateUnreferencedMergeCommitRequest => MergeBranchesResult, "CreateUnreferencedMergeCommit", idempotent = false);
operation!(GetMergeOptionsRequest => GetMergeOptionsResult, "GetMergeOptions", idempotent = true);
operation!(GetMergeCommitRequest => GetMergeCommitResult, "GetMergeCommit", idempotent = true);
operation!(GetMergeConflictsRequest => GetMergeConflictsResult, "GetMergeConflicts", idempotent = true);
operation!(DescribeMergeConflictsRequest => DescribeMergeConflictsResult, "DescribeMergeConflicts", idempotent = true);
operation!(BatchDescribeMergeConflictsRequest => BatchDescribeMergeConflictsResult, "BatchDescribeMergeConflicts", idempotent = true);
operation!(MergePullRequestByFastForwardRequest => MergePullRequestResult, "MergePullRequestByFastForward", idempotent = false);
operation!(MergePullRequestBySquashRequest => MergePullRequestResult, "MergePullRequestBySquash", idempotent = false);
operation!(MergePullRequestByThreeWayRequest => MergePullRequestResult, "MergePullRequestByThreeWay", idempotent = false);
operation!(CreatePullRequestRequest => CreatePullRequestResult, "CreatePullRequest", idempotent = true);
operation!(UpdatePullRequestStatusRequest => UpdatePullRequestStatusResult, "UpdatePullRequestStatus", idempotent = false);
operation!(CreatePullRequestApprovalRuleRequest => CreatePullRequestApprovalRuleResult, "CreatePullRequestApprovalRule", idempotent = false);
operation!(PostCommentReplyRequest => PostCommentReplyResult, "PostCommentReply", idempotent = true);
operation!(GetCommitRequest => GetCommitResult, "GetCommit", idempotent = true);
operation!(GetPullRequestRequest => GetPullRequestResult, "GetPullRequest", idempotent = true);
operation!(GetCommentReactionsRequest => GetCommentReactionsResult, "GetCommentReactions", idempotent = true);
operation!(GetPullRequestApprovalStatesRequest => GetPullRequestApprovalStatesResult, "GetPullRequestApprovalStates", idempotent = true);
operation!(GetPullRequestOverrideStateRequest => GetPullRequestOverrideStateResult, "GetPullRequestOverrideState", idempotent = true);
operation!(UpdatePullRequestApprovalStateRequest => EmptyResult, "UpdatePullRequestApprovalState", idempotent = false);
operation!(OverridePullRequestApprovalRulesRequest => EmptyResult, "OverridePullRequestApprovalRules", idempotent = false);

/// Asynchronous CodeCommit client.
#[derive(Debug, Clone)]
pub struct CodeCommitClient<T> {
    transport: T,
    retry: RetryPolicy,
}

impl CodeCommitClient<HttpTransport> {
    /// Build an HTTP client from a resolved, validated configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, CoreError> {
        let transport = HttpTransport::from_config(&config.client)?;
        Ok(Self::new(transport).with_retry_policy(RetryPolicy::from(&config.retry)))
    }
}

impl<T: Transport> CodeCommitClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Send any operation.
    #[instrument(skip_all, fields(operation = O::NAME))]
    pub async fn send<O: Operation>(&self, request: &O) -> Result<O::Output, CoreError> {
        request.validate()?;
        let body = serde_json::to_value(request).map_err(ServiceError::from)?;

        let mut attempt = 1;
        loop {
            match self.transport.invoke(O::NAME, body.clone()).await {
                Ok(value) => {
                    debug!(attempt, "decoding response");
                    let output = serde_json::from_value(value).map_err(ServiceError::from)?;
                    return Ok(output);
                }
                Err(e) if O::IDEMPOTENT && e.is_transient() && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_manual_merge_required() {
                        info!("merge needs conflict resolution");
                    }
                    return Err(e.into());
                }
            }
        }
    }

    pub async fn merge_branches_by_fast_forward(
        &self,
        request: &MergeBranchesByFastForwardRequest,
    ) -> Result<MergeBranchesResult, CoreError> {
        let result = self.send(request).await?;
        info!(commit_id = ?result.commit_id, "fast-forwarded branch");
        Ok(result)
    }

    pub async fn merge_branches_by_squash(
        &self,
        request: &MergeBranchesBySquashRequest,
    ) -> Result<MergeBranchesResult, CoreError> {
        let result = self.send(request).await?;
        info!(commit_id = ?result.commit_id, "squash-merged branches");
        Ok(result)
    }

    pub async fn merge_branches_by_three_way(
        &self,
        request: &MergeBranchesByThreeWayRequest,
    ) -> Result<MergeBranchesResult, CoreError> {
        let result = self.send(request).await?;
        info!(commit_id = ?result.commit_id, "three-way merged branches");
        Ok(result)
    }

    pub async fn create_unreferenced_merge_commit(
        &self,
        request: &CreateUnreferencedMergeCommitRequest,
    ) -> Result<MergeBranchesResult, CoreError> {
        self.send(request).await
    }

    pub async fn get_merge_options(
        &self,
        request: &GetMergeOptionsRequest,
    ) -> Result<GetMergeOptionsResult, CoreError> {
        self.send(request).await
    }

    pub async fn get_merge_commit(
        &self,
        request: &GetMergeCommitRequest,
    ) -> Result<GetMergeCommitResult, CoreError> {
        self.send(request).await
    }

    /// One page of conflicts. Metadata that breaks the counting rules is
    /// logged, not rejected.
    pub async fn get_merge_conflicts(
        &self,
        request: &GetMergeConflictsRequest,
    ) -> Result<GetMergeConflictsResult, CoreError> {
        let result = self.send(request).await?;
        warn_inconsistent(&result.conflict_metadata_list);
        Ok(result)
    }

    /// Follow `nextToken` until the last page and merge the pages into one
    /// result.
    pub async fn get_merge_conflicts_all(
        &self,
        request: &GetMergeConflictsRequest,
    ) -> Result<GetMergeConflictsResult, CoreError> {
        let mut current = request.clone();
        let mut seen = SeenTokens::starting_at(current.next_token());
        let mut metadata: Vec<ConflictMetadata> = Vec::new();
        let mut pages = 0;
        loop {
            let mut page = self.get_merge_conflicts(&current).await?;
            metadata.append(&mut page.conflict_metadata_list);
            pages += 1;
            match page.next_token.take() {
                Some(token) => {
                    seen.advance(&token)?;
                    current = current.with_next_token(Some(token));
                }
                None => {
                    debug!(pages, files = metadata.len(), "collected merge conflicts");
                    page.conflict_metadata_list = metadata;
                    return Ok(page);
                }
            }
        }
    }

    pub async fn describe_merge_conflicts(
        &self,
        request: &DescribeMergeConflictsRequest,
    ) -> Result<DescribeMergeConflictsResult, CoreError> {
        let result = self.send(request).await?;
        warn_inconsistent(std::slice::from_ref(&result.conflict_metadata));
        Ok(result)
    }

    /// Every hunk for one file, across all pages.
    pub async fn describe_merge_conflicts_all(
        &self,
        request: &DescribeMergeConflictsRequest,
    ) -> Result<DescribeMergeConflictsResult, CoreError> {
        let mut current = request.clone();
        let mut seen = SeenTokens::starting_at(current.next_token());
        let mut hunks: Vec<MergeHunk> = Vec::new();
        loop {
            let mut page = self.describe_merge_conflicts(&current).await?;
            hunks.append(&mut page.merge_hunks);
            match page.next_token.take() {
                Some(token) => {
                    seen.advance(&token)?;
                    current = current.with_next_token(Some(token));
                }
                None => {
                    page.merge_hunks = hunks;
                    return Ok(page);
                }
            }
        }
    }

    pub async fn batch_describe_merge_conflicts(
        &self,
        request: &BatchDescribeMergeConflictsRequest,
    ) -> Result<BatchDescribeMergeConflictsResult, CoreError> {
        let result = self.send(request).await?;
        let metadata: Vec<ConflictMetadata> = result
            .conflicts
            .iter()
            .filter_map(|c: &Conflict| c.conflict_metadata.clone())
            .collect();
        warn_inconsistent(&metadata);
        for error in &result.errors {
            warn!(
                path = %error.file_path,
                exception = %error.exception_name,
                "file could not be described"
            );
        }
        Ok(result)
    }

    pub async fn merge_pull_request_by_fast_forward(
        &self,
        request: &MergePullRequestByFastForwardRequest,
    ) -> Result<MergePullRequestResult, CoreError> {
        let result = self.send(request).await?;
        info!(pull_request_id = %request.pull_request_id(), "merged pull request by fast-forward");
        Ok(result)
    }

    pub async fn merge_pull_request_by_squash(
        &self,
        request: &MergePullRequestBySquashRequest,
    ) -> Result<MergePullRequestResult, CoreError> {
        let result = self.send(request).await?;
        info!(pull_request_id = %request.pull_request_id(), "merged pull request by squash");
        Ok(result)
    }

    pub async fn merge_pull_request_by_three_way(
        &self,
        request: &MergePullRequestByThreeWayRequest,
    ) -> Result<MergePullRequestResult, CoreError> {
        let result = self.send(request).await?;
        info!(pull_request_id = %request.pull_request_id(), "merged pull request by three-way merge");
        Ok(result)
    }

    pub async fn create_pull_request(
        &self,
        request: &CreatePullRequestRequest,
    ) -> Result<CreatePullRequestResult, CoreError> {
        let result = self.send(request).await?;
        info!(
            pull_request_id = ?result.pull_request.pull_request_id,
            token = %request.client_request_token(),
            "created pull request"
        );
        Ok(result)
    }

    pub async fn update_pull_request_status(
        &self,
        request: &UpdatePullRequestStatusRequest,
    ) -> Result<UpdatePullRequestStatusResult, CoreError> {
        self.send(request).await
    }

    pub async fn create_pull_request_approval_rule(
        &self,
        request: &CreatePullRequestApprovalRuleRequest,
    ) -> Result<CreatePullRequestApprovalRuleResult, CoreError> {
        let result = self.send(request).await?;
        if result.approval_rule.content_digest_matches() == Some(false) {
            warn!(
                rule = %request.approval_rule_name(),
                "approval rule digest does not match its content"
            );
        }
        Ok(result)
    }

    pub async fn get_pull_request(
        &self,
        request: &GetPullRequestRequest,
    ) -> Result<GetPullRequestResult, CoreError> {
        let result = self.send(request).await?;
        debug!(
            pull_request_id = %request.pull_request_id(),
            status = ?result.pull_request.pull_request_status,
            "fetched pull request"
        );
        Ok(result)
    }

    pub async fn get_pull_request_approval_states(
        &self,
        request: &GetPullRequestApprovalStatesRequest,
    ) -> Result<GetPullRequestApprovalStatesResult, CoreError> {
        self.send(request).await
    }

    pub async fn get_pull_request_override_state(
        &self,
        request: &GetPullRequestOverrideStateRequest,
    ) -> Result<GetPullRequestOverrideStateResult, CoreError> {
        self.send(request).await
    }

    pub async fn update_pull_request_approval_state(
        &self,
        request: &UpdatePullRequestApprovalStateRequest,
    ) -> Result<(), CoreError> {
        self.send(request).await?;
        info!(
            pull_request_id = %request.pull_request_id(),
            revision_id = %request.revision_id(),
            state = %request.approval_state(),
            "updated approval state"
        );
        Ok(())
    }

    pub async fn override_pull_request_approval_rules(
        &self,
        request: &OverridePullRequestApprovalRulesRequest,
    ) -> Result<(), CoreError> {
        self.send(request).await?;
        info!(
            pull_request_id = %request.pull_request_id(),
            revision_id = %request.revision_id(),
            status = %request.override_status(),
            "updated approval rule override"
        );
        Ok(())
    }

    pub async fn post_comment_reply(
        &self,
        request: &PostCommentReplyRequest,
    ) -> Result<PostCommentReplyResult, CoreError> {
        self.send(request).await
    }

    pub async fn get_comment_reactions(
        &self,
        request: &GetCommentReactionsRequest,
    ) -> Result<GetCommentReactionsResult, CoreError> {
        self.send(request).await
    }

    /// Every reaction on a comment, across all pages.
    pub async fn get_comment_reactions_all(
        &self,
        request: &GetCommentReactionsRequest,
    ) -> Result<GetCommentReactionsResult, CoreError> {
        let mut current = request.clone();
        let mut seen = SeenTokens::starting_at(current.next_token());
        let mut reactions = Vec::new();
        loop {
            let mut page = self.get_comment_reactions(&current).await?;
            reactions.append(&mut page.reactions_for_comment);
            match page.next_token.take() {
                Some(token) => {
                    seen.advance(&token)?;
                    current = current.with_next_token(Some(token));
                }
                None => {
                    page.reactions_for_comment = reactions;
                    return Ok(page);
                }
            }
        }
    }

    pub async fn get_commit(&self, request: &GetCommitRequest) -> Result<GetCommitResult, CoreError> {
        self.send(request).await
    }
}

fn warn_inconsistent(metadata: &[ConflictMetadata]) {
    for entry in metadata {
        if let Err(e) = entry.check_consistency() {
            warn!(path = %entry.file_path, error = %e, "inconsistent conflict metadata");
        }
    }
}

/// Pagination tokens handed out during one `_all` walk. A token that comes
/// back a second time means the pages form a cycle.
#[derive(Debug, Default)]
struct SeenTokens(HashSet<String>);

impl SeenTokens {
    fn starting_at(first: Option<&str>) -> Self {
        let mut seen = Self::default();
        if let Some(token) = first {
            seen.0.insert(token.to_string());
        }
        seen
    }

    fn advance(&mut self, next: &str) -> Result<(), ServiceError> {
        if !self.0.insert(next.to_string()) {
            return Err(ServiceError::Parse(format!(
                "pagination token repeated: {}",
                next
            )));
        }
        Ok(())
    }
}
