//! Field-level constraints checked before any request leaves the process.
//!
//! Each check returns [`ModelError::Validation`] naming the wire field, the
//! broken constraint, and the offending value.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::errors::ModelError;

pub const REPOSITORY_NAME_MAX: usize = 100;
pub const BRANCH_NAME_MAX: usize = 256;
pub const COMMIT_SPECIFIER_MAX: usize = 256;
/// 256 KiB.
pub const COMMIT_MESSAGE_MAX_BYTES: usize = 256 * 1024;
pub const AUTHOR_NAME_MAX: usize = 1024;
pub const APPROVAL_RULE_NAME_MAX: usize = 100;
pub const APPROVAL_RULE_CONTENT_MAX: usize = 3000;
pub const TITLE_MAX: usize = 150;
pub const DESCRIPTION_MAX: usize = 10_240;
pub const COMMENT_CONTENT_MAX: usize = 10_240;
pub const CLIENT_REQUEST_TOKEN_MAX: usize = 64;
pub const PAGE_SIZE_MAX: i32 = 1000;

fn repository_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // regex-lite has no Unicode classes, so spell out `\w` as ASCII.
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("static pattern"))
}

/// Values longer than this are shortened in error messages.
const ECHO_MAX: usize = 120;

fn echo(value: &str) -> String {
    if value.chars().count() <= ECHO_MAX {
        value.to_string()
    } else {
        let head: String = value.chars().take(ECHO_MAX).collect();
        format!("{}... ({} chars)", head, value.chars().count())
    }
}

/// Require `min..=max` characters.
pub fn char_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ModelError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ModelError::validation(
            field,
            format!("length {}..={} chars", min, max),
            echo(value),
        ));
    }
    Ok(())
}

/// Repository names: 1–100 chars of letters, digits, `_`, `.` and `-`.
pub fn repository_name(value: &str) -> Result<(), ModelError> {
    char_length("repositoryName", value, 1, REPOSITORY_NAME_MAX)?;
    if !repository_name_pattern().is_match(value) {
        return Err(ModelError::validation(
            "repositoryName",
            r"pattern [\w.-]+",
            echo(value),
        ));
    }
    Ok(())
}

/// Commit specifiers are opaque to the client; only presence and length
/// are checked.
pub fn commit_specifier(field: &str, value: &str) -> Result<(), ModelError> {
    char_length(field, value, 1, COMMIT_SPECIFIER_MAX)
}

pub fn branch_name(field: &str, value: &str) -> Result<(), ModelError> {
    char_length(field, value, 1, BRANCH_NAME_MAX)
}

/// Commit messages are limited by encoded size, not characters.
pub fn commit_message(value: &str) -> Result<(), ModelError> {
    if value.len() > COMMIT_MESSAGE_MAX_BYTES {
        return Err(ModelError::validation(
            "commitMessage",
            format!("at most {} bytes", COMMIT_MESSAGE_MAX_BYTES),
            format!("{} bytes", value.len()),
        ));
    }
    Ok(())
}

pub fn author_name(value: &str) -> Result<(), ModelError> {
    char_length("authorName", value, 1, AUTHOR_NAME_MAX)
}

pub fn email(value: &str) -> Result<(), ModelError> {
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(ModelError::validation("email", "address with '@'", echo(value)));
    }
    Ok(())
}

pub fn approval_rule_name(value: &str) -> Result<(), ModelError> {
    char_length("approvalRuleName", value, 1, APPROVAL_RULE_NAME_MAX)
}

pub fn approval_rule_content(value: &str) -> Result<(), ModelError> {
    char_length("approvalRuleContent", value, 1, APPROVAL_RULE_CONTENT_MAX)
}

pub fn title(value: &str) -> Result<(), ModelError> {
    char_length("title", value, 1, TITLE_MAX)
}

pub fn description(value: &str) -> Result<(), ModelError> {
    char_length("description", value, 0, DESCRIPTION_MAX)
}

pub fn comment_content(value: &str) -> Result<(), ModelError> {
    char_length("content", value, 1, COMMENT_CONTENT_MAX)
}

/// Pull request ids are decimal numbers carried as strings.
pub fn pull_request_id(value: &str) -> Result<(), ModelError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::validation("pullRequestId", "decimal digits", echo(value)));
    }
    Ok(())
}

pub fn client_request_token(value: &str) -> Result<(), ModelError> {
    char_length("clientRequestToken", value, 1, CLIENT_REQUEST_TOKEN_MAX)
}

/// Revision ids are opaque; only presence is checked.
pub fn revision_id(value: &str) -> Result<(), ModelError> {
    if value.is_empty() {
        return Err(ModelError::validation("revisionId", "required", ""));
    }
    Ok(())
}

pub fn comment_id(value: &str) -> Result<(), ModelError> {
    if value.is_empty() {
        return Err(ModelError::validation("commentId", "required", ""));
    }
    Ok(())
}

pub fn file_path(field: &str, value: &str) -> Result<(), ModelError> {
    if value.is_empty() {
        return Err(ModelError::validation(field, "required", ""));
    }
    Ok(())
}

/// Page-size style limits such as `maxConflictFiles`.
pub fn page_size(field: &str, value: i32) -> Result<(), ModelError> {
    if !(1..=PAGE_SIZE_MAX).contains(&value) {
        return Err(ModelError::validation(
            field,
            format!("range 1..={}", PAGE_SIZE_MAX),
            value.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_name_rules() {
        assert!(repository_name("my-repo.1").is_ok());
        assert!(repository_name("under_score").is_ok());
        assert!(repository_name(&"a".repeat(100)).is_ok());

        let err = repository_name("my repo").unwrap_err();
        assert_eq!(err.field(), Some("repositoryName"));
        assert!(matches!(err, ModelError::Validation { ref value, .. } if value == "my repo"));

        assert!(repository_name(&"a".repeat(101)).is_err());
        assert!(repository_name("").is_err());
        assert!(repository_name("slash/name").is_err());
    }

    #[test]
    fn test_commit_message_size_limit() {
        let exact = "x".repeat(COMMIT_MESSAGE_MAX_BYTES);
        assert!(commit_message(&exact).is_ok());

        let over = "x".repeat(COMMIT_MESSAGE_MAX_BYTES + 1);
        let err = commit_message(&over).unwrap_err();
        assert_eq!(err.field(), Some("commitMessage"));
    }

    #[test]
    fn test_commit_message_counts_bytes_not_chars() {
        // 'é' is two bytes in UTF-8.
        let msg = "é".repeat(COMMIT_MESSAGE_MAX_BYTES / 2 + 1);
        assert!(commit_message(&msg).is_err());
    }

    #[test]
    fn test_approval_rule_content_bounds() {
        assert!(approval_rule_content("{}").is_ok());
        assert!(approval_rule_content(&"r".repeat(3000)).is_ok());
        assert!(approval_rule_content(&"r".repeat(3001)).is_err());
        assert!(approval_rule_content("").is_err());
    }

    #[test]
    fn test_branch_and_specifier_lengths() {
        assert!(branch_name("targetBranch", "main").is_ok());
        assert!(branch_name("targetBranch", &"b".repeat(256)).is_ok());
        assert!(branch_name("targetBranch", &"b".repeat(257)).is_err());
        assert!(commit_specifier("sourceCommitSpecifier", "").is_err());
    }

    #[test]
    fn test_email_and_ids() {
        assert!(email("dev@example.com").is_ok());
        assert!(email("dev").is_err());
        assert!(email("@example.com").is_err());
        assert!(pull_request_id("42").is_ok());
        assert!(pull_request_id("pr-42").is_err());
        assert!(pull_request_id("").is_err());
    }

    #[test]
    fn test_page_size() {
        assert!(page_size("maxConflictFiles", 1).is_ok());
        assert!(page_size("maxConflictFiles", 1000).is_ok());
        assert!(page_size("maxConflictFiles", 0).is_err());
        assert!(page_size("maxMergeHunks", 1001).is_err());
    }

    #[test]
    fn test_long_values_are_shortened_in_errors() {
        let err = title(&"t".repeat(500)).unwrap_err();
        let ModelError::Validation { value, .. } = err else {
            panic!("expected validation error");
        };
        assert!(value.ends_with("(500 chars)"));
    }
}
