//! Approval requests: vote on a pull request revision, set its rules
//! aside, and read back either state.
//!
//! Every call here names the revision it applies to. A vote or override
//! sent against a stale revision is rejected by the service.

use serde::{Deserialize, Serialize};

use crate::enums::{ApprovalState, OverrideStatus};
use crate::errors::ModelError;
use crate::requests::{required, Validate};
use crate::validation;

fn validate_revision(pull_request_id: &str, revision_id: &str) -> Result<(), ModelError> {
    validation::pull_request_id(pull_request_id)?;
    validation::revision_id(revision_id)
}

// ---------------------------------------------------------------------------
// GetPullRequestApprovalStates / GetPullRequestOverrideState
// ---------------------------------------------------------------------------

/// Who has approved one revision of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestApprovalStatesRequest {
    pull_request_id: String,
    revision_id: String,
}

/// Whether the approval rules of one revision have been overridden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPullRequestOverrideStateRequest {
    pull_request_id: String,
    revision_id: String,
}

macro_rules! revision_read {
    ($request:ident, $builder:ident) => {
        impl $request {
            pub fn builder() -> $builder {
                $builder::default()
            }

            pub fn new(
                pull_request_id: impl Into<String>,
                revision_id: impl Into<String>,
            ) -> Result<Self, ModelError> {
                Self::builder()
                    .pull_request_id(pull_request_id)
                    .revision_id(revision_id)
                    .build()
            }

            pub fn pull_request_id(&self) -> &str {
                &self.pull_request_id
            }

            pub fn revision_id(&self) -> &str {
                &self.revision_id
            }
        }

        impl Validate for $request {
            fn validate(&self) -> Result<(), ModelError> {
                validate_revision(&self.pull_request_id, &self.revision_id)
            }
        }

        #[derive(Debug, Clone, Default)]
        #[must_use]
        pub struct $builder {
            pull_request_id: Option<String>,
            revision_id: Option<String>,
        }

        impl $builder {
            pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
                self.pull_request_id = Some(id.into());
                self
            }

            pub fn revision_id(mut self, id: impl Into<String>) -> Self {
                self.revision_id = Some(id.into());
                self
            }

            pub fn build(self) -> Result<$request, ModelError> {
                let request = $request {
                    pull_request_id: required("pullRequestId", self.pull_request_id)?,
                    revision_id: required("revisionId", self.revision_id)?,
                };
                request.validate()?;
                Ok(request)
            }
        }
    };
}

revision_read!(GetPullRequestApprovalStatesRequest, GetPullRequestApprovalStatesRequestBuilder);
revision_read!(GetPullRequestOverrideStateRequest, GetPullRequestOverrideStateRequestBuilder);

// ---------------------------------------------------------------------------
// UpdatePullRequestApprovalState
// ---------------------------------------------------------------------------

/// Approve a revision, or take back an earlier approval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePullRequestApprovalStateRequest {
    pull_request_id: String,
    revision_id: String,
    approval_state: ApprovalState,
}

impl UpdatePullRequestApprovalStateRequest {
    pub fn builder() -> UpdatePullRequestApprovalStateRequestBuilder {
        UpdatePullRequestApprovalStateRequestBuilder::default()
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }

    pub fn approval_state(&self) -> ApprovalState {
        self.approval_state
    }
}

impl Validate for UpdatePullRequestApprovalStateRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validate_revision(&self.pull_request_id, &self.revision_id)
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct UpdatePullRequestApprovalStateRequestBuilder {
    pull_request_id: Option<String>,
    revision_id: Option<String>,
    approval_state: Option<ApprovalState>,
}

impl UpdatePullRequestApprovalStateRequestBuilder {
    pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
        self.pull_request_id = Some(id.into());
        self
    }

    pub fn revision_id(mut self, id: impl Into<String>) -> Self {
        self.revision_id = Some(id.into());
        self
    }

    pub fn approval_state(mut self, state: ApprovalState) -> Self {
        self.approval_state = Some(state);
        self
    }

    pub fn build(self) -> Result<UpdatePullRequestApprovalStateRequest, ModelError> {
        let request = UpdatePullRequestApprovalStateRequest {
            pull_request_id: required("pullRequestId", self.pull_request_id)?,
            revision_id: required("revisionId", self.revision_id)?,
            approval_state: self
                .approval_state
                .ok_or_else(|| ModelError::validation("approvalState", "required", ""))?,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// OverridePullRequestApprovalRules
// ---------------------------------------------------------------------------

/// Set aside a revision's approval rules, or revoke an earlier override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridePullRequestApprovalRulesRequest {
    pull_request_id: String,
    revision_id: String,
    override_status: OverrideStatus,
}

impl OverridePullRequestApprovalRulesRequest {
    pub fn builder() -> OverridePullRequestApprovalRulesRequestBuilder {
        OverridePullRequestApprovalRulesRequestBuilder::default()
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }

    pub fn override_status(&self) -> OverrideStatus {
        self.override_status
    }
}

impl Validate for OverridePullRequestApprovalRulesRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validate_revision(&self.pull_request_id, &self.revision_id)
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct OverridePullRequestApprovalRulesRequestBuilder {
    pull_request_id: Option<String>,
    revision_id: Option<String>,
    override_status: Option<OverrideStatus>,
}

impl OverridePullRequestApprovalRulesRequestBuilder {
    pub fn pull_request_id(mut self, id: impl Into<String>) -> Self {
        self.pull_request_id = Some(id.into());
        self
    }

    pub fn revision_id(mut self, id: impl Into<String>) -> Self {
        self.revision_id = Some(id.into());
        self
    }

    pub fn override_status(mut self, status: OverrideStatus) -> Self {
        self.override_status = Some(status);
        self
    }

    pub fn build(self) -> Result<OverridePullRequestApprovalRulesRequest, ModelError> {
        let request = OverridePullRequestApprovalRulesRequest {
            pull_request_id: required("pullRequestId", self.pull_request_id)?,
            revision_id: required("revisionId", self.revision_id)?,
            override_status: self
                .override_status
                .ok_or_else(|| ModelError::validation("overrideStatus", "required", ""))?,
        };
        request.validate()?;
        Ok(request)
    }
}
