//! Pull request requests: create, read, merge, close, and attach approval
//! rules.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::MergePolicy;
use crate::enums::PullRequestStatus;
use crate::errors::ModelError;
use crate::requests::{generate_client_request_token, required, CommitDetails, Validate};
use crate::validation;

fn validate_source_commit_id(source_commit_id: Option<&str>) -> Result<(), ModelError> {
    match source_commit_id {
        Some(id) => validation::commit_specifier("sourceCommitId", id),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// MergePullRequestByFastForward
// ---------------------------------------------------------------------------

/// Close a pull request by fast-forwarding its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePullRequestByFastForwardRequest {
    pull_request_id: String,
    repository_name: String,
    /// When set, the merge only happens if the source tip still matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_commit_id: Option<String>,
}

impl MergePullRequestByFastForwardRequest {
    pub fn builder() -> MergePullRequestByFastForwardRequestBuilder {
        MergePullRequestByFastForwardRequestBuilder::default()
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn source_commit_id(&self) -> Option<&str> {
        self.source_commit_id.as_deref()
    }
}

impl Validate for MergePullRequestByFastForwardRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::pull_request_id(&self.pull_request_id)?;
        validation::repository_name(&self.repository_name)?;
        validate_source_commit_id(self.source_commit_id.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct MergePullRequestByFastForwardRequestBuilder {
    pull_request_id: Option<String>,
    repository_name: Option<String>,
    source_commit_id: Option<String>,
}

impl MergePullRequestByFastForwardRequestBuilder {
    pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
        self.pull_request_id = Some(id.into());
        self
    }

    pub fn repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository_name = Some(name.into());
        self
    }

    pub fn source_commit_id(mut self, id: impl Into<String>) -> Self {
        self.source_commit_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<MergePullRequestByFastForwardRequest, ModelError> {
        let request = MergePullRequestByFastForwardRequest {
            pull_request_id: required("pullRequestId", self.pull_request_id)?,
            repository_name: required("repositoryName", self.repository_name)?,
            source_commit_id: self.source_commit_id,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// MergePullRequestBySquash / MergePullRequestByThreeWay
// ---------------------------------------------------------------------------

/// Close a pull request by squashing its changes onto the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePullRequestBySquashRequest {
    pull_request_id: String,
    repository_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_commit_id: Option<String>,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(flatten)]
    commit: CommitDetails,
}

/// Close a pull request with a three-way merge commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePullRequestByThreeWayRequest {
    pull_request_id: String,
    repository_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_commit_id: Option<String>,
    #[serde(flatten)]
    policy: MergePolicy,
    #[serde(flatten)]
    commit: CommitDetails,
}

macro_rules! merge_pull_request {
    ($request:ident, $builder:ident) => {
        impl $request {
            pub fn builder() -> $builder {
                $builder::default()
            }

            pub fn pull_request_id(&self) -> &str {
                &self.pull_request_id
            }

            pub fn repository_name(&self) -> &str {
                &self.repository_name
            }

            pub fn source_commit_id(&self) -> Option<&str> {
                self.source_commit_id.as_deref()
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
                validation::pull_request_id(&self.pull_request_id)?;
                validation::repository_name(&self.repository_name)?;
                validate_source_commit_id(self.source_commit_id.as_deref())?;
                self.policy.validate()?;
                self.commit.validate()
            }
        }

        #[derive(Debug, Clone, Default)]
        #[must_use]
        pub struct $builder {
            pull_request_id: Option<String>,
            repository_name: Option<String>,
            source_commit_id: Option<String>,
            policy: MergePolicy,
            commit: CommitDetails,
        }

        impl $builder {
            policy_setters!();
            resolution_setter!();
            commit_details_setters!();

            pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
                self.pull_request_id = Some(id.into());
                self
            }

            pub fn repository_name(mut self, name: impl Into<String>) -> Self {
                self.repository_name = Some(name.into());
                self
            }

            pub fn source_commit_id(mut self, id: impl Into<String>) -> Self {
                self.source_commit_id = Some(id.into());
                self
            }

            pub fn build(self) -> Result<$request, ModelError> {
                let request = $request {
                    pull_request_id: required("pullRequestId", self.pull_request_id)?,
                    repository_name: required("repositoryName", self.repository_name)?,
                    source_commit_id: self.source_commit_id,
                    policy: self.policy,
                    commit: self.commit,
                };
                request.validate()?;
                debug!(
                    request = stringify!($request),
                    pull_request_id = %request.pull_request_id,
                    "built pull request merge"
                );
                Ok(request)
            }
        }
    };
}

merge_pull_request!(MergePullRequestBySquashRequest, MergePullRequestBySquashRequestBuilder);
merge_pull_request!(MergePullRequestByThreeWayRequest, MergePullRequestByThreeWayRequestBuilder);

// ---------------------------------------------------------------------------
// CreatePullRequest
// ---------------------------------------------------------------------------

/// One source/destination pair in a new pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub repository_name: String,
    pub source_reference: String,
    /// Defaults to the repository's default branch when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_reference: Option<String>,
}

impl Target {
    pub fn new(repository_name: impl Into<String>, source_reference: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            source_reference: source_reference.into(),
            destination_reference: None,
        }
    }

    pub fn with_destination(mut self, reference: impl Into<String>) -> Self {
        self.destination_reference = Some(reference.into());
        self
    }
}

impl Validate for Target {
    fn validate(&self) -> Result<(), ModelError> {
        validation::repository_name(&self.repository_name)?;
        validation::branch_name("sourceReference", &self.source_reference)?;
        if let Some(ref destination) = self.destination_reference {
            validation::branch_name("destinationReference", destination)?;
        }
        Ok(())
    }
}

/// Open a pull request. The idempotency token makes retries safe; one is
/// generated when the caller does not supply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestRequest {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    targets: Vec<Target>,
    client_request_token: String,
}

impl CreatePullRequestRequest {
    pub fn builder() -> CreatePullRequestRequestBuilder {
        CreatePullRequestRequestBuilder::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn client_request_token(&self) -> &str {
        &self.client_request_token
    }
}

impl Validate for CreatePullRequestRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::title(&self.title)?;
        if let Some(ref description) = self.description {
            validation::description(description)?;
        }
        if self.targets.is_empty() {
            return Err(ModelError::validation("targets", "at least one target", "[]"));
        }
        for target in &self.targets {
            target.validate()?;
        }
        validation::client_request_token(&self.client_request_token)
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct CreatePullRequestRequestBuilder {
    title: Option<String>,
    description: Option<String>,
    targets: Vec<Target>,
    client_request_token: Option<String>,
}

impl CreatePullRequestRequestBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Sent exactly as given.
    pub fn client_request_token(mut self, token: impl Into<String>) -> Self {
        self.client_request_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<CreatePullRequestRequest, ModelError> {
        let client_request_token = match self.client_request_token {
            Some(token) => token,
            None => generate_client_request_token(),
        };
        let request = CreatePullRequestRequest {
            title: required("title", self.title)?,
            description: self.description,
            targets: self.targets,
            client_request_token,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// UpdatePullRequestStatus
// ---------------------------------------------------------------------------

/// Change a pull request's status. Only `OPEN -> CLOSED` exists, so the
/// only status that can be requested is `CLOSED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePullRequestStatusRequest {
    pull_request_id: String,
    pull_request_status: PullRequestStatus,
}

impl UpdatePullRequestStatusRequest {
    pub fn builder() -> UpdatePullRequestStatusRequestBuilder {
        UpdatePullRequestStatusRequestBuilder::default()
    }

    /// Shorthand for closing a pull request.
    pub fn close(pull_request_id: impl Into<String>) -> Result<Self, ModelError> {
        Self::builder()
            .pull_request_id(pull_request_id)
            .pull_request_status(PullRequestStatus::Closed)
            .build()
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    pub fn pull_request_status(&self) -> PullRequestStatus {
        self.pull_request_status
    }
}

impl Validate for UpdatePullRequestStatusRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::pull_request_id(&self.pull_request_id)?;
        if !PullRequestStatus::Open.can_transition_to(self.pull_request_status) {
            return Err(ModelError::violation(
                "pull request status only moves from OPEN to CLOSED",
                format!("requested {}", self.pull_request_status),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct UpdatePullRequestStatusRequestBuilder {
    pull_request_id: Option<String>,
    pull_request_status: Option<PullRequestStatus>,
}

impl UpdatePullRequestStatusRequestBuilder {
    pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
        self.pull_request_id = Some(id.into());
        self
    }

    pub fn pull_request_status(mut self, status: PullRequestStatus) -> Self {
        self.pull_request_status = Some(status);
        self
    }

    pub fn build(self) -> Result<UpdatePullRequestStatusRequest, ModelError> {
        let request = UpdatePullRequestStatusRequest {
            pull_request_id: required("pullRequestId", self.pull_request_id)?,
            pull_request_status: self
                .pull_request_status
                .ok_or_else(|| ModelError::validation("pullRequestStatus", "required", ""))?,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// GetPullRequest
// ---------------------------------------------------------------------------

/// Fetch the current state of one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestRequest {
    pull_request_id: String,
}

impl GetPullRequestRequest {
    pub fn new(pull_request_id: impl Into<String>) -> Result<Self, ModelError> {
        let request = Self {
            pull_request_id: pull_request_id.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }
}

impl Validate for GetPullRequestRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::pull_request_id(&self.pull_request_id)
    }
}

// ---------------------------------------------------------------------------
// CreatePullRequestApprovalRule
// ---------------------------------------------------------------------------

/// Attach an approval rule to a pull request. The content is an approval
/// rule document; only its length is checked locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestApprovalRuleRequest {
    pull_request_id: String,
    approval_rule_name: String,
    approval_rule_content: String,
}

impl CreatePullRequestApprovalRuleRequest {
    pub fn builder() -> CreatePullRequestApprovalRuleRequestBuilder {
        CreatePullRequestApprovalRuleRequestBuilder::default()
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    pub fn approval_rule_name(&self) -> &str {
        &self.approval_rule_name
    }

    pub fn approval_rule_content(&self) -> &str {
        &self.approval_rule_content
    }
}

impl Validate for CreatePullRequestApprovalRuleRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::pull_request_id(&self.pull_request_id)?;
        validation::approval_rule_name(&self.approval_rule_name)?;
        validation::approval_rule_content(&self.approval_rule_content)
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct CreatePullRequestApprovalRuleRequestBuilder {
    pull_request_id: Option<String>,
    approval_rule_name: Option<String>,
    approval_rule_content: Option<String>,
}

impl CreatePullRequestApprovalRuleRequestBuilder {
    pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
        self.pull_request_id = Some(id.into());
        self
    }

    pub fn approval_rule_name(mut self, name: impl Into<String>) -> Self {
        self.approval_rule_name = Some(name.into());
        self
    }

    pub fn approval_rule_content(mut self, content: impl Into<String>) -> Self {
        self.approval_rule_content = Some(content.into());
        self
    }

    pub fn build(self) -> Result<CreatePullRequestApprovalRuleRequest, ModelError> {
        let request = CreatePullRequestApprovalRuleRequest {
            pull_request_id: required("pullRequestId", self.pull_request_id)?,
            approval_rule_name: required("approvalRuleName", self.approval_rule_name)?,
            approval_rule_content: required("approvalRuleContent", self.approval_rule_content)?,
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictResolution;
    use crate::enums::{ConflictDetailLevel, ConflictResolutionStrategy};

    #[test]
    fn test_three_way_pull_request_merge_wire_shape() {
        let request = MergePullRequestByThreeWayRequest::builder()
            .pull_request_id("47")
            .repository_name("MyDemoRepo")
            .source_commit_id("99132ab0EXAMPLE")
            .conflict_detail_level(ConflictDetailLevel::LineLevel)
            .conflict_resolution_strategy(ConflictResolutionStrategy::AcceptSource)
            .commit_message("Merging PR 47")
            .author_name("Jorge Souza")
            .email("jorge_souza@example.com")
            .build()
            .unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["pullRequestId"], "47");
        assert_eq!(json["repositoryName"], "MyDemoRepo");
        assert_eq!(json["sourceCommitId"], "99132ab0EXAMPLE");
        assert_eq!(json["conflictDetailLevel"], "LINE_LEVEL");
        assert_eq!(json["conflictResolutionStrategy"], "ACCEPT_SOURCE");
        assert_eq!(json["commitMessage"], "Merging PR 47");

        let back: MergePullRequestByThreeWayRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_pull_request_merge_requires_id_and_repository() {
        let err = MergePullRequestBySquashRequest::builder()
            .repository_name("demo")
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("pullRequestId"));

        let err = MergePullRequestByFastForwardRequest::builder()
            .pull_request_id("abc")
            .repository_name("demo")
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("pullRequestId"));
    }

    #[test]
    fn test_pull_request_merge_policy_rule_applies() {
        let err = MergePullRequestBySquashRequest::builder()
            .pull_request_id("1")
            .repository_name("demo")
            .conflict_resolution(ConflictResolution::new().delete("gone.txt"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::ConstraintViolation { .. }));
    }

    #[test]
    fn test_create_pull_request_preserves_token() {
        let request = CreatePullRequestRequest::builder()
            .title("Pronunciation difficulty analyzer")
            .description("Please review.")
            .target(Target::new("MyDemoRepo", "jane-branch").with_destination("main"))
            .client_request_token("123Example")
            .build()
            .unwrap();
        assert_eq!(request.client_request_token(), "123Example");

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""clientRequestToken":"123Example""#));
        let back: CreatePullRequestRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.client_request_token(), "123Example");
        assert_eq!(back.targets()[0].destination_reference.as_deref(), Some("main"));
    }

    #[test]
    fn test_create_pull_request_generates_token() {
        let build = || {
            CreatePullRequestRequest::builder()
                .title("t")
                .target(Target::new("demo", "feature-x"))
                .build()
                .unwrap()
        };
        let a = build();
        let b = build();
        assert!(!a.client_request_token().is_empty());
        assert_ne!(a.client_request_token(), b.client_request_token());
    }

    #[test]
    fn test_create_pull_request_limits() {
        let err = CreatePullRequestRequest::builder()
            .title("t".repeat(151))
            .target(Target::new("demo", "feature-x"))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("title"));

        let err = CreatePullRequestRequest::builder().title("t").build().unwrap_err();
        assert_eq!(err.field(), Some("targets"));

        let err = CreatePullRequestRequest::builder()
            .title("t")
            .target(Target::new("demo", "feature-x"))
            .client_request_token("x".repeat(65))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("clientRequestToken"));
    }

    #[test]
    fn test_status_update_only_closes() {
        let request = UpdatePullRequestStatusRequest::close("42").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["pullRequestStatus"], "CLOSED");

        let err = UpdatePullRequestStatusRequest::builder()
            .pull_request_id("42")
            .pull_request_status(PullRequestStatus::Open)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::ConstraintViolation { .. }));
    }

    #[test]
    fn test_get_pull_request() {
        let request = GetPullRequestRequest::new("42").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"pullRequestId": "42"})
        );
        let err = GetPullRequestRequest::new("").unwrap_err();
        assert_eq!(err.field(), Some("pullRequestId"));
    }

    #[test]
    fn test_approval_rule_bounds() {
        let content = r#"{"Version": "2018-11-08","Statements": [{"Type": "Approvers","NumberOfApprovalsNeeded": 2}]}"#;
        let request = CreatePullRequestApprovalRuleRequest::builder()
            .pull_request_id("27")
            .approval_rule_name("Require two approved approvers")
            .approval_rule_content(content)
            .build()
            .unwrap();
        assert_eq!(request.approval_rule_content(), content);

        let err = CreatePullRequestApprovalRuleRequest::builder()
            .pull_request_id("27")
            .approval_rule_name("n".repeat(101))
            .approval_rule_content(content)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("approvalRuleName"));

        let err = CreatePullRequestApprovalRuleRequest::builder()
            .pull_request_id("27")
            .approval_rule_name("rule")
            .approval_rule_content("c".repeat(3001))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("approvalRuleContent"));
    }
}
