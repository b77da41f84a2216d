//! Tests for the comment gateway's per-step status handling.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use http::{Method, StatusCode};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

use super::{CommentGateway, FastForward};
use crate::comment::{BranchName, CommentId};
use crate::github::error::PublishError;
use crate::github::locator::{RepositoryPair, RepositoryRef};
use crate::github::test_support::{
    ScriptedTransport, already_up_to_date, base_ref, content_created, github_error, merged,
    pull_created, ref_created, ref_deleted,
};
use crate::github::transport::ApiResponse;

#[fixture]
fn runtime() -> Runtime {
    Runtime::new().expect("runtime should start")
}

#[fixture]
fn branch() -> BranchName {
    CommentId::generate(Utc::now()).branch_name()
}

fn repositories() -> RepositoryPair {
    RepositoryPair {
        source: RepositoryRef::new("fork-owner", "site").expect("source should be valid"),
        destination: RepositoryRef::new("upstream", "site").expect("destination should be valid"),
    }
}

fn scripted_gateway(
    responses: Vec<Result<ApiResponse, PublishError>>,
) -> (Arc<ScriptedTransport>, CommentGateway<Arc<ScriptedTransport>>) {
    let transport = Arc::new(ScriptedTransport::new(responses));
    let gateway = CommentGateway::new(Arc::clone(&transport), repositories(), "master");
    (transport, gateway)
}

fn sent_json(transport: &ScriptedTransport, index: usize) -> Value {
    let requests = transport.requests();
    let body = requests
        .get(index)
        .and_then(|request| request.body.clone())
        .expect("request should carry a body");
    serde_json::from_str(&body).expect("body should be JSON")
}

#[rstest]
fn fast_forward_merges_upstream_base_into_source(runtime: Runtime) {
    let (transport, gateway) = scripted_gateway(vec![Ok(merged())]);

    let outcome = runtime
        .block_on(gateway.fast_forward())
        .expect("merge should succeed");

    assert_eq!(
        outcome,
        FastForward::Merged {
            sha: "merge-sha".to_owned()
        }
    );
    assert_eq!(
        transport.request_lines(),
        vec!["POST /repos/fork-owner/site/merges"]
    );
    let payload = sent_json(&transport, 0);
    assert_eq!(payload["base"], "master");
    assert_eq!(payload["head"], "upstream:master");
}

#[rstest]
fn fast_forward_accepts_nothing_to_merge(runtime: Runtime) {
    let (_, gateway) = scripted_gateway(vec![Ok(already_up_to_date())]);
    let outcome = runtime
        .block_on(gateway.fast_forward())
        .expect("204 should count as success");
    assert_eq!(outcome, FastForward::UpToDate);
}

#[rstest]
#[case(StatusCode::CONFLICT, "Merge conflict")]
#[case(StatusCode::NOT_FOUND, "Base does not exist")]
#[case(StatusCode::UNPROCESSABLE_ENTITY, "Validation Failed")]
fn fast_forward_surfaces_rejections(
    runtime: Runtime,
    #[case] status: StatusCode,
    #[case] message: &str,
) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(status, message))]);
    let result = runtime.block_on(gateway.fast_forward());

    match result {
        Err(PublishError::MergeFailed { message: detail }) => {
            assert!(detail.contains(message), "detail should quote GitHub: {detail}");
            assert!(
                detail.contains(&status.as_u16().to_string()),
                "detail should quote the status: {detail}"
            );
        }
        other => panic!("expected MergeFailed, got {other:?}"),
    }
}

#[rstest]
fn fast_forward_rejects_undocumented_success_status(runtime: Runtime) {
    let body = json!({ "sha": "merge-sha" }).to_string();
    let (_, gateway) = scripted_gateway(vec![Ok(ApiResponse::new(StatusCode::OK, body))]);

    let result = runtime.block_on(gateway.fast_forward());

    assert!(
        matches!(result, Err(PublishError::MergeFailed { .. })),
        "only 201 and 204 count as merged, got {result:?}"
    );
}

#[rstest]
fn bad_credentials_map_to_authentication(runtime: Runtime) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(
        StatusCode::UNAUTHORIZED,
        "Bad credentials",
    ))]);
    let result = runtime.block_on(gateway.fast_forward());
    assert!(
        matches!(result, Err(PublishError::Authentication { .. })),
        "expected Authentication, got {result:?}"
    );
}

#[rstest]
fn rate_limited_forbidden_stays_a_step_failure(runtime: Runtime) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(
        StatusCode::FORBIDDEN,
        "API rate limit exceeded for user",
    ))]);
    let result = runtime.block_on(gateway.fast_forward());
    assert!(
        matches!(result, Err(PublishError::MergeFailed { .. })),
        "expected MergeFailed, got {result:?}"
    );
}

#[rstest]
fn base_sha_reads_object_sha(runtime: Runtime) {
    let (transport, gateway) = scripted_gateway(vec![Ok(base_ref("abc123"))]);
    let sha = runtime
        .block_on(gateway.base_sha())
        .expect("lookup should succeed");

    assert_eq!(sha, "abc123");
    assert_eq!(
        transport.request_lines(),
        vec!["GET /repos/fork-owner/site/git/refs/heads/master"]
    );
}

#[rstest]
fn base_sha_rejects_reference_without_sha(runtime: Runtime) {
    let body = json!({ "ref": "refs/heads/master", "object": {} }).to_string();
    let (_, gateway) = scripted_gateway(vec![Ok(ApiResponse::new(StatusCode::OK, body))]);

    let result = runtime.block_on(gateway.base_sha());
    assert!(
        matches!(result, Err(PublishError::MalformedResponse { .. })),
        "expected MalformedResponse, got {result:?}"
    );
}

#[rstest]
fn base_sha_reports_missing_branch(runtime: Runtime) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(StatusCode::NOT_FOUND, "Not Found"))]);
    let result = runtime.block_on(gateway.base_sha());
    assert!(
        matches!(result, Err(PublishError::BranchCreateFailed { .. })),
        "expected BranchCreateFailed, got {result:?}"
    );
}

#[rstest]
fn create_branch_posts_fully_qualified_ref(runtime: Runtime, branch: BranchName) {
    let (transport, gateway) = scripted_gateway(vec![Ok(ref_created("abc123"))]);

    runtime
        .block_on(gateway.create_branch(&branch, "abc123"))
        .expect("branch creation should succeed");

    assert_eq!(
        transport.request_lines(),
        vec!["POST /repos/fork-owner/site/git/refs"]
    );
    let payload = sent_json(&transport, 0);
    assert_eq!(payload["ref"], branch.ref_path());
    assert_eq!(payload["sha"], "abc123");
}

#[rstest]
fn create_branch_reports_existing_reference(runtime: Runtime, branch: BranchName) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Reference already exists",
    ))]);
    let result = runtime.block_on(gateway.create_branch(&branch, "abc123"));
    assert!(
        matches!(result, Err(PublishError::BranchCreateFailed { .. })),
        "expected BranchCreateFailed, got {result:?}"
    );
}

#[rstest]
fn create_branch_requires_created_status(runtime: Runtime, branch: BranchName) {
    let (_, gateway) = scripted_gateway(vec![Ok(base_ref("abc123"))]);
    let result = runtime.block_on(gateway.create_branch(&branch, "abc123"));
    assert!(
        matches!(result, Err(PublishError::BranchCreateFailed { .. })),
        "a 200 is not a created reference, got {result:?}"
    );
}

#[rstest]
fn create_branch_reports_unreadable_created_body(runtime: Runtime, branch: BranchName) {
    let (_, gateway) =
        scripted_gateway(vec![Ok(ApiResponse::new(StatusCode::CREATED, "{}"))]);
    let result = runtime.block_on(gateway.create_branch(&branch, "abc123"));
    assert!(
        matches!(result, Err(PublishError::MalformedResponse { .. })),
        "expected MalformedResponse, got {result:?}"
    );
}

#[rstest]
fn create_comment_file_puts_base64_content_on_branch(runtime: Runtime, branch: BranchName) {
    let (transport, gateway) = scripted_gateway(vec![Ok(content_created())]);

    runtime
        .block_on(gateway.create_comment_file(
            &branch,
            "_data/comments/my post/entry1.json",
            "New comment on my post from Bob",
            b"{\"comment\":\"hi\"}",
        ))
        .expect("file commit should succeed");

    let requests = transport.requests();
    let request = requests.first().expect("one request expected");
    assert_eq!(request.method, Method::PUT);
    assert_eq!(
        request.path,
        "/repos/fork-owner/site/contents/_data/comments/my%20post/entry1.json"
    );

    let payload = sent_json(&transport, 0);
    assert_eq!(payload["branch"], branch.as_str());
    assert_eq!(payload["message"], "New comment on my post from Bob");
    let decoded = STANDARD
        .decode(payload["content"].as_str().expect("content should be a string"))
        .expect("content should be base64");
    assert_eq!(decoded, b"{\"comment\":\"hi\"}");
}

#[rstest]
fn create_comment_file_reports_rejection(runtime: Runtime, branch: BranchName) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(
        StatusCode::CONFLICT,
        "is at abc but expected def",
    ))]);
    let result = runtime.block_on(gateway.create_comment_file(&branch, "a/b.json", "msg", b"{}"));
    assert!(
        matches!(result, Err(PublishError::FileCommitFailed { .. })),
        "expected FileCommitFailed, got {result:?}"
    );
}

#[rstest]
fn create_pull_request_targets_destination(runtime: Runtime, branch: BranchName) {
    let (transport, gateway) = scripted_gateway(vec![Ok(pull_created(42))]);

    let created = runtime
        .block_on(gateway.create_pull_request(&branch, "New comment", "body"))
        .expect("pull request should be created");

    assert_eq!(created.number, 42);
    assert_eq!(
        transport.request_lines(),
        vec!["POST /repos/upstream/site/pulls"]
    );
    let payload = sent_json(&transport, 0);
    assert_eq!(payload["head"], format!("fork-owner:{branch}"));
    assert_eq!(payload["base"], "master");
    assert_eq!(payload["title"], "New comment");
    assert_eq!(payload["body"], "body");
}

#[rstest]
fn create_pull_request_reports_rejection(runtime: Runtime, branch: BranchName) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "No commits between master and comment",
    ))]);
    let result = runtime.block_on(gateway.create_pull_request(&branch, "t", "b"));
    assert!(
        matches!(result, Err(PublishError::PullRequestCreateFailed { .. })),
        "expected PullRequestCreateFailed, got {result:?}"
    );
}

#[rstest]
fn delete_branch_targets_source_ref(runtime: Runtime, branch: BranchName) {
    let (transport, gateway) = scripted_gateway(vec![Ok(ref_deleted())]);
    runtime
        .block_on(gateway.delete_branch(&branch))
        .expect("deletion should succeed");
    assert_eq!(
        transport.request_lines(),
        vec![format!("DELETE /repos/fork-owner/site/git/refs/heads/{branch}")]
    );
}

#[rstest]
fn delete_branch_reports_rejection(runtime: Runtime, branch: BranchName) {
    let (_, gateway) = scripted_gateway(vec![Ok(github_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Reference does not exist",
    ))]);
    let result = runtime.block_on(gateway.delete_branch(&branch));
    assert!(
        matches!(result, Err(PublishError::Api { .. })),
        "expected Api, got {result:?}"
    );
}

#[rstest]
fn transport_failures_propagate_unchanged(runtime: Runtime) {
    let failure = PublishError::Network {
        message: "connection reset".to_owned(),
    };
    let (_, gateway) = scripted_gateway(vec![Err(failure.clone())]);
    let result = runtime.block_on(gateway.fast_forward());
    assert_eq!(result, Err(failure));
}
