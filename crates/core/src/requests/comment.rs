//! Comment requests: reply to a comment and read its reactions.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::requests::{generate_client_request_token, required, Validate};
use crate::validation;

/// Reply to an existing comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentReplyRequest {
    in_reply_to: String,
    client_request_token: String,
    content: String,
}

impl PostCommentReplyRequest {
    pub fn builder() -> PostCommentReplyRequestBuilder {
        PostCommentReplyRequestBuilder::default()
    }

    pub fn in_reply_to(&self) -> &str {
        &self.in_reply_to
    }

    pub fn client_request_token(&self) -> &str {
        &self.client_request_token
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Validate for PostCommentReplyRequest {
    fn validate(&self) -> Result<(), ModelError> {
        if self.in_reply_to.is_empty() {
            return Err(ModelError::validation("inReplyTo", "required", ""));
        }
        validation::client_request_token(&self.client_request_token)?;
        validation::comment_content(&self.content)
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct PostCommentReplyRequestBuilder {
    in_reply_to: Option<String>,
    client_request_token: Option<String>,
    content: Option<String>,
}

impl PostCommentReplyRequestBuilder {
    /// Id of the comment being answered.
    pub fn in_reply_to(mut self, comment_id: impl Into<String>) -> Self {
        self.in_reply_to = Some(comment_id.into());
        self
    }

    pub fn client_request_token(mut self, token: impl Into<String>) -> Self {
        self.client_request_token = Some(token.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn build(self) -> Result<PostCommentReplyRequest, ModelError> {
        let request = PostCommentReplyRequest {
            in_reply_to: required("inReplyTo", self.in_reply_to)?,
            client_request_token: self
                .client_request_token
                .unwrap_or_else(generate_client_request_token),
            content: required("content", self.content)?,
        };
        request.validate()?;
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// GetCommentReactions
// ---------------------------------------------------------------------------

/// Reactions left on one comment, optionally narrowed to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCommentReactionsRequest {
    comment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reaction_user_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_results: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

impl GetCommentReactionsRequest {
    pub fn builder() -> GetCommentReactionsRequestBuilder {
        GetCommentReactionsRequestBuilder::default()
    }

    pub fn comment_id(&self) -> &str {
        &self.comment_id
    }

    pub fn reaction_user_arn(&self) -> Option<&str> {
        self.reaction_user_arn.as_deref()
    }

    pub fn max_results(&self) -> Option<i32> {
        self.max_results
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    /// Same request, positioned at another page.
    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

impl Validate for GetCommentReactionsRequest {
    fn validate(&self) -> Result<(), ModelError> {
        validation::comment_id(&self.comment_id)?;
        if let Some(max) = self.max_results {
            validation::page_size("maxResults", max)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct GetCommentReactionsRequestBuilder {
    comment_id: Option<String>,
    reaction_user_arn: Option<String>,
    max_results: Option<i32>,
    next_token: Option<String>,
}

impl GetCommentReactionsRequestBuilder {
    pub fn comment_id(mut self, id: impl Into<String>) -> Self {
        self.comment_id = Some(id.into());
        self
    }

    /// Only return reactions from this user.
    pub fn reaction_user_arn(mut self, arn: impl Into<String>) -> Self {
        self.reaction_user_arn = Some(arn.into());
        self
    }

    pub fn max_results(mut self, max: i32) -> Self {
        self.max_results = Some(max);
        self
    }

    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<GetCommentReactionsRequest, ModelError> {
        let request = GetCommentReactionsRequest {
            comment_id: required("commentId", self.comment_id)?,
            reaction_user_arn: self.reaction_user_arn,
            max_results: self.max_results,
            next_token: self.next_token,
        };
        request.validate()?;
        Ok(request)
    }
}
