//! End-to-end tests for `CodeCommitClient` over a scripted in-memory
//! transport.
//!
//! The transport replays canned responses in order and records every call,
//! so these tests cover serialization, decoding, retry and pagination
//! without network I/O.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use codecommit_core::client::{CodeCommitClient, RetryPolicy, Transport};
use codecommit_core::enums::{
    ApprovalState, ConflictDetailLevel, ConflictResolutionStrategy, MergeOption,
};
use codecommit_core::errors::{CoreError, ServiceError};
use codecommit_core::models::Comment;
use codecommit_core::requests::{
    CreatePullRequestRequest, DescribeMergeConflictsRequest, GetCommentReactionsRequest,
    GetCommitRequest, GetMergeConflictsRequest, GetPullRequestApprovalStatesRequest,
    GetPullRequestRequest, MergeBranchesByThreeWayRequest, MergePullRequestBySquashRequest,
    PostCommentReplyRequest, Target, UpdatePullRequestApprovalStateRequest,
};

// ===========================================================================
// Helpers
// ===========================================================================

#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, ServiceError>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<Value, ServiceError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn invoke(&self, operation: &str, body: Value) -> Result<Value, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), body));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Parse("script exhausted".into())))
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    }
}

fn client(transport: &Arc<ScriptedTransport>) -> CodeCommitClient<Arc<ScriptedTransport>> {
    CodeCommitClient::new(Arc::clone(transport)).with_retry_policy(fast_retry())
}

fn throttled() -> ServiceError {
    ServiceError::Throttled("Rate exceeded".into())
}

fn conflicts_request() -> GetMergeConflictsRequest {
    GetMergeConflictsRequest::builder()
        .repository_name("demo")
        .source_commit_specifier("feature-x")
        .destination_commit_specifier("main")
        .merge_option(MergeOption::ThreeWay)
        .conflict_detail_level(ConflictDetailLevel::LineLevel)
        .build()
        .unwrap()
}

fn conflict_page(paths: &[&str], next_token: Option<&str>) -> Value {
    let list: Vec<Value> = paths
        .iter()
        .map(|p| {
            json!({
                "filePath": p,
                "numberOfConflicts": 1,
                "contentConflict": true,
                "mergeOperations": {"source": "M", "destination": "M"}
            })
        })
        .collect();
    let mut page = json!({
        "mergeable": false,
        "sourceCommitId": "6ccd57fdEXAMPLE",
        "destinationCommitId": "86958e0aEXAMPLE",
        "conflictMetadataList": list
    });
    if let Some(token) = next_token {
        page["nextToken"] = json!(token);
    }
    page
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn test_three_way_merge_round_trip() {
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "commitId": "4c925148EXAMPLE",
        "treeId": "347a3408EXAMPLE"
    }))]);
    let request = MergeBranchesByThreeWayRequest::builder()
        .repository_name("demo")
        .source_commit_specifier("feature-x")
        .destination_commit_specifier("main")
        .conflict_detail_level(ConflictDetailLevel::LineLevel)
        .conflict_resolution_strategy(ConflictResolutionStrategy::None)
        .build()
        .unwrap();

    let result = client(&transport)
        .merge_branches_by_three_way(&request)
        .await
        .unwrap();
    assert_eq!(result.commit_id.as_deref(), Some("4c925148EXAMPLE"));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "MergeBranchesByThreeWay");
    assert_eq!(calls[0].1, serde_json::to_value(&request).unwrap());
    assert_eq!(calls[0].1["conflictDetailLevel"], "LINE_LEVEL");
}

#[tokio::test]
async fn test_reads_retry_transient_errors() {
    let transport = ScriptedTransport::new(vec![
        Err(throttled()),
        Err(ServiceError::Service {
            code: "InternalFailure".into(),
            message: "try again".into(),
            status: 500,
        }),
        Ok(conflict_page(&["a.txt"], None)),
    ]);

    let result = client(&transport)
        .get_merge_conflicts(&conflicts_request())
        .await
        .unwrap();
    assert_eq!(result.conflict_metadata_list.len(), 1);
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn test_retry_budget_is_respected() {
    let transport = ScriptedTransport::new(vec![
        Err(throttled()),
        Err(throttled()),
        Err(throttled()),
        Ok(conflict_page(&[], None)),
    ]);

    let err = client(&transport)
        .get_merge_conflicts(&conflicts_request())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Throttled(_))));
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn test_merges_are_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(throttled()), Ok(json!({}))]);
    let request = MergePullRequestBySquashRequest::builder()
        .pull_request_id("47")
        .repository_name("demo")
        .build()
        .unwrap();

    let err = client(&transport)
        .merge_pull_request_by_squash(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Throttled(_))));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_manual_merge_required_surfaces_unchanged() {
    let transport = ScriptedTransport::new(vec![Err(ServiceError::Service {
        code: "ManualMergeRequiredException".into(),
        message: "conflicts must be resolved".into(),
        status: 400,
    })]);
    let request = MergeBranchesByThreeWayRequest::builder()
        .repository_name("demo")
        .source_commit_specifier("feature-x")
        .destination_commit_specifier("main")
        .build()
        .unwrap();

    let err = client(&transport)
        .merge_branches_by_three_way(&request)
        .await
        .unwrap_err();
    match err {
        CoreError::Service(e) => assert!(e.is_manual_merge_required()),
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pagination_collects_every_page() {
    let transport = ScriptedTransport::new(vec![
        Ok(conflict_page(&["a.txt", "b.txt"], Some("page-2"))),
        Ok(conflict_page(&["c.txt"], Some("page-3"))),
        Ok(conflict_page(&["d.txt"], None)),
    ]);

    let result = client(&transport)
        .get_merge_conflicts_all(&conflicts_request())
        .await
        .unwrap();
    let paths: Vec<_> = result
        .conflict_metadata_list
        .iter()
        .map(|m| m.file_path.as_str())
        .collect();
    assert_eq!(paths, ["a.txt", "b.txt", "c.txt", "d.txt"]);
    assert!(result.next_token.is_none());

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].1.get("nextToken").is_none());
    assert_eq!(calls[1].1["nextToken"], "page-2");
    assert_eq!(calls[2].1["nextToken"], "page-3");
}

#[tokio::test]
async fn test_pagination_stops_on_repeated_token() {
    let transport = ScriptedTransport::new(vec![
        Ok(conflict_page(&["a.txt"], Some("same"))),
        Ok(conflict_page(&["b.txt"], Some("same"))),
    ]);

    let err = client(&transport)
        .get_merge_conflicts_all(&conflicts_request())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Parse(_))));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_pagination_stops_on_token_cycle() {
    let mut pages = Vec::new();
    for i in 0..50 {
        let token = if i % 2 == 0 { "A" } else { "B" };
        pages.push(Ok(conflict_page(&["loop.txt"], Some(token))));
    }
    let transport = ScriptedTransport::new(pages);

    let err = client(&transport)
        .get_merge_conflicts_all(&conflicts_request())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Parse(_))));
    // A, B, then A again.
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn test_describe_stops_on_token_cycle() {
    let page = |token: &str| -> Result<Value, ServiceError> {
        Ok(json!({
            "conflictMetadata": {"filePath": "a.txt", "numberOfConflicts": 1, "contentConflict": true},
            "mergeHunks": [{"isConflict": true}],
            "nextToken": token
        }))
    };
    let transport = ScriptedTransport::new(vec![page("A"), page("B"), page("A"), page("B")]);
    let request = DescribeMergeConflictsRequest::builder()
        .repository_name("demo")
        .source_commit_specifier("feature-x")
        .destination_commit_specifier("main")
        .merge_option(MergeOption::ThreeWay)
        .file_path("a.txt")
        .build()
        .unwrap();

    let err = client(&transport)
        .describe_merge_conflicts_all(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Parse(_))));
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn test_describe_collects_hunks_across_pages() {
    let transport = ScriptedTransport::new(vec![
        Ok(json!({
            "conflictMetadata": {"filePath": "a.txt", "numberOfConflicts": 2, "contentConflict": true},
            "mergeHunks": [{"isConflict": true}],
            "nextToken": "more"
        })),
        Ok(json!({
            "conflictMetadata": {"filePath": "a.txt", "numberOfConflicts": 2, "contentConflict": true},
            "mergeHunks": [{"isConflict": false}, {"isConflict": true}]
        })),
    ]);
    let request = DescribeMergeConflictsRequest::builder()
        .repository_name("demo")
        .source_commit_specifier("feature-x")
        .destination_commit_specifier("main")
        .merge_option(MergeOption::ThreeWay)
        .file_path("a.txt")
        .build()
        .unwrap();

    let result = client(&transport)
        .describe_merge_conflicts_all(&request)
        .await
        .unwrap();
    assert_eq!(result.merge_hunks.len(), 3);
    assert_eq!(result.conflict_metadata.file_path, "a.txt");
}

#[tokio::test]
async fn test_create_pull_request_resends_same_token() {
    let transport = ScriptedTransport::new(vec![
        Err(throttled()),
        Ok(json!({
            "pullRequest": {
                "pullRequestId": "42",
                "pullRequestStatus": "OPEN",
                "clientRequestToken": "123Example",
                "creationDate": 1508962823.285
            }
        })),
    ]);
    let request = CreatePullRequestRequest::builder()
        .title("Add analyzer")
        .target(Target::new("demo", "feature-x").with_destination("main"))
        .client_request_token("123Example")
        .build()
        .unwrap();

    let result = client(&transport)
        .create_pull_request(&request)
        .await
        .unwrap();
    assert!(result.pull_request.is_open());

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    for (_, body) in &calls {
        assert_eq!(body["clientRequestToken"], "123Example");
    }
}

#[tokio::test]
async fn test_deserialized_invalid_request_is_not_sent() {
    let transport = ScriptedTransport::new(vec![Ok(json!({}))]);
    let request: GetCommitRequest = serde_json::from_value(json!({
        "repositoryName": "not valid",
        "commitId": "317f8570EXAMPLE"
    }))
    .unwrap();

    let err = client(&transport).get_commit(&request).await.unwrap_err();
    assert!(matches!(err, CoreError::Model(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_undecodable_response_is_a_parse_error() {
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "comment": {"commentId": "c2", "creationDate": "yesterday"}
    }))]);
    let request = PostCommentReplyRequest::builder()
        .in_reply_to("c1")
        .content("thanks")
        .build()
        .unwrap();

    let err = client(&transport)
        .post_comment_reply(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Parse(_))));
}

#[tokio::test]
async fn test_get_pull_request_reads_current_state() {
    let transport = ScriptedTransport::new(vec![
        Err(throttled()),
        Ok(json!({
            "pullRequest": {
                "pullRequestId": "47",
                "pullRequestStatus": "CLOSED",
                "revisionId": "9f29d167EXAMPLE",
                "pullRequestTargets": [{
                    "repositoryName": "demo",
                    "sourceReference": "refs/heads/feature-x",
                    "destinationReference": "refs/heads/main",
                    "mergeMetadata": {"isMerged": true, "mergeOption": "SQUASH_MERGE"}
                }]
            }
        })),
    ]);
    let request = GetPullRequestRequest::new("47").unwrap();

    let result = client(&transport).get_pull_request(&request).await.unwrap();
    assert!(!result.pull_request.is_open());
    assert!(result.pull_request.is_fully_merged());
    assert_eq!(result.pull_request.revision_id.as_deref(), Some("9f29d167EXAMPLE"));

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, "GetPullRequest");
    assert_eq!(calls[1].1, json!({"pullRequestId": "47"}));
}

#[tokio::test]
async fn test_comment_reactions_across_pages() {
    let transport = ScriptedTransport::new(vec![
        Ok(json!({
            "reactionsForComment": [{
                "reaction": {"emoji": "👍", "shortCode": ":thumbsup:", "unicode": "U+1F44D"},
                "reactionUsers": ["arn:aws:iam::123456789012:user/Li_Juan"],
                "reactionsFromDeletedUsersCount": 1
            }],
            "nextToken": "page-2"
        })),
        Ok(json!({
            "reactionsForComment": [{
                "reaction": {"emoji": "🎉", "shortCode": ":tada:", "unicode": "U+1F389"},
                "reactionUsers": ["arn:aws:iam::123456789012:user/Mary_Major"]
            }]
        })),
    ]);
    let request = GetCommentReactionsRequest::builder()
        .comment_id("abcd1234EXAMPLEb5678efgh")
        .build()
        .unwrap();

    let result = client(&transport)
        .get_comment_reactions_all(&request)
        .await
        .unwrap();
    assert_eq!(result.reactions_for_comment.len(), 2);

    let mut comment = Comment::default();
    result.apply_to(&mut comment);
    assert_eq!(comment.reaction_counts.get(":thumbsup:"), Some(&2));
    assert_eq!(comment.reaction_counts.get(":tada:"), Some(&1));

    let calls = transport.calls();
    assert_eq!(calls[0].0, "GetCommentReactions");
    assert_eq!(calls[1].1["nextToken"], "page-2");
}

#[tokio::test]
async fn test_approval_vote_then_read_back() {
    let transport = ScriptedTransport::new(vec![
        Ok(json!({})),
        Ok(json!({"approvals": [
            {"userArn": "arn:aws:iam::123456789012:user/Mary_Major", "approvalState": "APPROVE"}
        ]})),
    ]);
    let client = client(&transport);

    let vote = UpdatePullRequestApprovalStateRequest::builder()
        .pull_request_id("27")
        .revision_id("9f29d167EXAMPLE")
        .approval_state(ApprovalState::Approve)
        .build()
        .unwrap();
    client.update_pull_request_approval_state(&vote).await.unwrap();

    let read = GetPullRequestApprovalStatesRequest::new("27", "9f29d167EXAMPLE").unwrap();
    let states = client.get_pull_request_approval_states(&read).await.unwrap();
    assert_eq!(states.approvers().count(), 1);

    let calls = transport.calls();
    assert_eq!(calls[0].0, "UpdatePullRequestApprovalState");
    assert_eq!(calls[0].1["approvalState"], "APPROVE");
    assert_eq!(calls[1].0, "GetPullRequestApprovalStates");
}

#[tokio::test]
async fn test_approval_vote_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(throttled()), Ok(json!({}))]);
    let vote = UpdatePullRequestApprovalStateRequest::builder()
        .pull_request_id("27")
        .revision_id("9f29d167EXAMPLE")
        .approval_state(ApprovalState::Revoke)
        .build()
        .unwrap();

    let err = client(&transport)
        .update_pull_request_approval_state(&vote)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Throttled(_))));
    assert_eq!(transport.calls().len(), 1);
}
