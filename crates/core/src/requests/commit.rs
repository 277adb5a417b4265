//! Commit lookup by id.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::requests::{required, Validate};
use crate::validation;

/// Fetch one commit by its full id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCommitRequest {
    repository_name: String,
    commit_id: String,
}

impl GetCommitRequest {
    pub fn builder() -> GetCommitRequestBuilder {
        GetCommitRequestBuilder::default()
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }
}

impl Validate for GetCommitRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::repository_name(&self.repository_name)?;
        validation::commit_specifier("commitId", &self.commit_id)
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct GetCommitRequestBuilder {
    repository_name: Option<String>,
    commit_id: Option<String>,
}

impl GetCommitRequestBuilder {
    pub fn repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository_name = Some(name.into());
        self
    }

    pub fn commit_id(mut self, id: impl Into<String>) -> Self {
        self.commit_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<GetCommitRequest, ModelError> {
        let request = GetCommitRequest {
            repository_name: required("repositoryName", self.repository_name)?,
            commit_id: required("commitId", self.commit_id)?,
        };
        request.validate()?;
        Ok(request)
    }
}
