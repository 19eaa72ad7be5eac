use std::sync::Arc;

use octocrab::Octocrab;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::{ChangedFile, Commit, FileStatus, GitHub, OctocrabGitHub, PullRequestDetails, RepoId};

const PR_ROUTE: &str = "/repos/docker/docker/pulls/42";

fn client(mock_server: &MockServer) -> OctocrabGitHub {
    // https://github.com/flows-network/octocrab/blob/main/examples/custom_client.rs
    OctocrabGitHub::new(Arc::new(
        Octocrab::builder()
            .base_uri(mock_server.uri())
            .unwrap()
            .build()
            .unwrap(),
    ))
}

fn repo() -> RepoId {
    RepoId::new("docker", "docker")
}

async fn mount_get(mock_server: &MockServer, uri: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(uri))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(mock_server)
        .await;
}

fn github_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(json!({
        "documentation_url": "",
        "errors": None::<Vec<serde_json::Value>>,
        "message": message,
    }))
}

fn user(login: &str) -> serde_json::Value {
    let url = format!("https://api.github.com/users/{login}");
    json!({
        "login": login,
        "id": 583_231,
        "node_id": "MDQ6VXNlcjU4MzIzMQ==",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "gravatar_id": "",
        "url": url,
        "html_url": format!("https://github.com/{login}"),
        "followers_url": format!("{url}/followers"),
        "following_url": format!("{url}/following{{/other_user}}"),
        "gists_url": format!("{url}/gists{{/gist_id}}"),
        "starred_url": format!("{url}/starred{{/owner}}{{/repo}}"),
        "subscriptions_url": format!("{url}/subscriptions"),
        "organizations_url": format!("{url}/orgs"),
        "repos_url": format!("{url}/repos"),
        "events_url": format!("{url}/events{{/privacy}}"),
        "received_events_url": format!("{url}/received_events"),
        "type": "User",
        "site_admin": false,
    })
}

fn commit(sha: &str, message: &str, verification: Option<serde_json::Value>) -> serde_json::Value {
    let url = format!("https://api.github.com/repos/docker/docker/commits/{sha}");
    let mut commit = json!({
        "url": url,
        "sha": sha,
        "node_id": "C_kwDOAAABc9oAKGFhYQ",
        "html_url": format!("https://github.com/docker/docker/commit/{sha}"),
        "comments_url": format!("{url}/comments"),
        "commit": {
            "url": format!("https://api.github.com/repos/docker/docker/git/commits/{sha}"),
            "message": message,
            "comment_count": 0,
            "tree": {
                "sha": "d7f5b2a1c3e4f6a8b9c0d1e2f3a4b5c6d7e8f9a0",
                "url": "https://api.github.com/repos/docker/docker/git/trees/d7f5b2a1c3e4f6a8b9c0d1e2f3a4b5c6d7e8f9a0",
            },
        },
        "author": null,
        "committer": null,
        "parents": [],
    });
    if let Some(verification) = verification {
        commit["commit"]["verification"] = verification;
    }
    commit
}

fn diff_entry(filename: &str, status: &str) -> serde_json::Value {
    json!({
        "sha": "bbcd538c8e72b8c175046e27cc8f907076331401",
        "filename": filename,
        "status": status,
        "additions": 1,
        "deletions": 1,
        "changes": 2,
        "blob_url": null,
        "raw_url": null,
        "contents_url": format!("https://api.github.com/repos/docker/docker/contents/{filename}"),
    })
}

#[tokio::test]
async fn should_fetch_pull_request_details() {
    let mock_server = MockServer::start().await;
    mount_get(
        &mock_server,
        PR_ROUTE,
        json!({
            "url": "https://api.github.com/repos/docker/docker/pulls/42",
            "id": 27_825_927,
            "number": 42,
            "title": "Fix typo in README.md",
            "commits": 2,
            "head": {
                "ref": "typo",
                "sha": "f88f7bd4250b963752d615e491b7e676ce5eb7f0",
                "repo": {
                    "id": 2,
                    "name": "docker",
                    "url": "https://api.github.com/repos/octocat/docker",
                    "ssh_url": "git@github.com:octocat/docker.git",
                    "clone_url": "https://github.com/octocat/docker.git",
                },
            },
            "base": {
                "ref": "master",
                "sha": "a4786471ee4d4e894fec150e426c3551db0f31e0",
            },
        }),
    )
    .await;
    mount_get(
        &mock_server,
        &format!("{PR_ROUTE}/commits"),
        json!([
            commit(
                "aaa",
                "Fix typo\n\nSigned-off-by: Octo Cat <octo@example.com>",
                Some(json!({ "verified": false, "reason": "unsigned", "payload": null, "signature": null })),
            ),
            commit(
                "bbb",
                "Fix another typo",
                Some(json!({ "verified": true, "reason": "valid", "payload": "tree", "signature": "sig" })),
            ),
            commit("ccc", "Fix a third typo", None),
        ]),
    )
    .await;
    mount_get(
        &mock_server,
        &format!("{PR_ROUTE}/files"),
        json!([
            diff_entry("README.md", "modified"),
            diff_entry("docs/old.md", "removed"),
        ]),
    )
    .await;

    let details = client(&mock_server)
        .pull_request(&repo(), 42)
        .await
        .unwrap();

    assert_eq!(
        details,
        PullRequestDetails {
            commit_count: Some(2),
            head_ssh_url: Some("git@github.com:octocat/docker.git".to_owned()),
            commits: vec![
                Commit {
                    sha: "aaa".to_owned(),
                    message: "Fix typo\n\nSigned-off-by: Octo Cat <octo@example.com>".to_owned(),
                    verified: false,
                },
                Commit {
                    sha: "bbb".to_owned(),
                    message: "Fix another typo".to_owned(),
                    verified: true,
                },
                Commit {
                    sha: "ccc".to_owned(),
                    message: "Fix a third typo".to_owned(),
                    verified: false,
                },
            ],
            files: vec![
                ChangedFile {
                    filename: "README.md".to_owned(),
                    status: FileStatus::Modified,
                },
                ChangedFile {
                    filename: "docs/old.md".to_owned(),
                    status: FileStatus::Removed,
                },
            ],
        }
    );
}

#[tokio::test]
async fn should_fail_when_pull_request_is_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(github_error("Server Error"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .pull_request(&repo(), 42)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to get docker/docker#42");
}

#[tokio::test]
async fn should_add_labels() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/docker/docker/issues/42/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 208_045_946,
            "node_id": "MDU6TGFiZWwyMDgwNDU5NDY=",
            "url": "https://api.github.com/repos/docker/docker/labels/1-design-review",
            "name": "1-design-review",
            "description": null,
            "color": "f29513",
            "default": false,
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .add_labels(&repo(), 42, &["1-design-review".to_owned()])
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({ "labels": ["1-design-review"] }));
}

#[tokio::test]
async fn should_add_comment() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/docker/docker/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "node_id": "MDEyOklzc3VlQ29tbWVudDE=",
            "url": "https://api.github.com/repos/docker/docker/issues/comments/1",
            "html_url": "https://github.com/docker/docker/pull/42#issuecomment-1",
            "issue_url": "https://api.github.com/repos/docker/docker/issues/42",
            "body": "Hello",
            "user": user("patch-parser"),
            "created_at": "2024-03-01T12:00:00Z",
            "updated_at": "2024-03-01T12:00:00Z",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .add_comment(&repo(), 42, "Hello")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({ "body": "Hello" }));
}

#[tokio::test]
async fn should_fail_when_comment_is_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(github_error("Resource not accessible by integration"))
        .mount(&mock_server)
        .await;

    let res = client(&mock_server).add_comment(&repo(), 42, "Hello").await;
    assert!(res.is_err());
}
