//! Integration tests for the request pipeline, driven through a mock API
//! server.

use gitpulse::{
    GitHubClient, GitHubConfig, GitHubErrorKind, RateLimitInfo, RetryConfig, StateFilter,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GitHubClient {
    GitHubClient::builder()
        .base_url(server.uri())
        .user_agent("gitpulse-tests/1.0")
        .token("test_token")
        .retry(RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(50),
            multiplier: 2.0,
        })
        .build()
        .unwrap()
}

fn rate_limited_response(status: u16, remaining: u32) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("x-ratelimit-limit", "60")
        .insert_header("x-ratelimit-remaining", remaining.to_string().as_str())
        .insert_header("x-ratelimit-reset", "1900000000")
        .insert_header("x-ratelimit-used", (60 - remaining).to_string().as_str())
}

fn commit_json(sha: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "commit": {
            "message": format!("commit {}", sha),
            "author": {
                "name": "Dev",
                "email": "dev@example.com",
                "date": "2024-06-01T10:00:00Z"
            },
            "committer": null
        },
        "author": { "id": 1, "login": "dev" },
        "html_url": format!("https://github.com/owner/repo/commit/{}", sha)
    })
}

fn pull_request_json(number: u64) -> serde_json::Value {
    json!({
        "id": number * 100,
        "number": number,
        "title": format!("PR {}", number),
        "state": "open",
        "user": { "id": 1, "login": "dev" },
        "html_url": format!("https://github.com/owner/repo/pull/{}", number),
        "head": { "ref": "feature", "sha": "abc123" },
        "base": { "ref": "main", "sha": "def456" },
        "created_at": "2024-06-01T10:00:00Z",
        "updated_at": "2024-06-02T10:00:00Z"
    })
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn auth_and_accept_headers_are_sent() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .and(header("User-Agent", "gitpulse-tests/1.0"))
        .and(header("Authorization", "token test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Rust": 1024 })))
        .expect(1)
        .mount(&server)
        .await;

    let languages = client.repositories().languages("owner", "repo").await.unwrap();
    assert_eq!(languages.get("Rust"), Some(&1024));
}

#[tokio::test]
async fn swapped_token_applies_to_subsequent_requests() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .and(header("Authorization", "token rotated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.set_token(Some("rotated"));
    client.repositories().languages("owner", "repo").await.unwrap();
}

#[tokio::test]
async fn rate_limit_headers_reach_subscribers() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .respond_with(rate_limited_response(200, 59).set_body_json(json!({})))
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<RateLimitInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = client.on_rate_limit_change(move |info| {
        sink.lock().unwrap().push(info.clone());
    });

    client.repositories().languages("owner", "repo").await.unwrap();

    let snapshots = seen.lock().unwrap().clone();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].limit, 60);
    assert_eq!(snapshots[0].remaining, 59);
    assert_eq!(snapshots[0].used, 1);
    assert_eq!(snapshots[0].reset_at.timestamp(), 1_900_000_000);

    assert_eq!(client.rate_limit_info().unwrap().remaining, 59);

    // Unsubscribing (twice, harmlessly) stops further notifications.
    subscription.unsubscribe();
    subscription.unsubscribe();
    client.repositories().languages("owner", "repo").await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dropping_subscription_handle_removes_the_listener() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .respond_with(rate_limited_response(200, 58).set_body_json(json!({})))
        .mount(&server)
        .await;

    let calls = Arc::new(Mutex::new(0u32));
    let counter = calls.clone();
    let subscription = client.on_rate_limit_change(move |_| {
        *counter.lock().unwrap() += 1;
    });
    drop(subscription);

    client.repositories().languages("owner", "repo").await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 0);
    // The snapshot itself is still recorded.
    assert_eq!(client.rate_limit_info().unwrap().remaining, 58);
}

#[tokio::test]
async fn primary_rate_limit_short_circuits_without_retry() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo"))
        .respond_with(
            rate_limited_response(403, 0)
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .mount(&server)
        .await;

    let error = client.repositories().get("owner", "repo").await.unwrap_err();

    assert_eq!(*error.kind(), GitHubErrorKind::RateLimited);
    assert!(error.is_rate_limited());
    assert!(error.retry_after().is_some());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn secondary_rate_limit_retries_then_raises() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_json(json!({ "message": "You have exceeded a secondary rate limit" })),
        )
        .mount(&server)
        .await;

    let error = client.repositories().get("owner", "repo").await.unwrap_err();

    assert_eq!(*error.kind(), GitHubErrorKind::SecondaryRateLimit);
    assert!(error.is_rate_limited());
    // max_retries = 2, so three attempts in total.
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn secondary_rate_limit_then_success_returns_body() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Go": 7 })))
        .mount(&server)
        .await;

    let languages = client.repositories().languages("owner", "repo").await.unwrap();
    assert_eq!(languages.get("Go"), Some(&7));
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "C": 3 })))
        .mount(&server)
        .await;

    let languages = client.repositories().languages("owner", "repo").await.unwrap();
    assert_eq!(languages.get("C"), Some(&3));
}

#[tokio::test]
async fn persistent_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let error = client.repositories().get("owner", "repo").await.unwrap_err();

    assert_eq!(*error.kind(), GitHubErrorKind::InternalError);
    assert_eq!(error.status_code(), Some(500));
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let error = client.repositories().get("owner", "missing").await.unwrap_err();

    assert_eq!(*error.kind(), GitHubErrorKind::NotFound);
    assert_eq!(error.message(), "Not Found");
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn error_message_falls_back_to_status_text() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let error = client.repositories().get("owner", "repo").await.unwrap_err();
    assert_eq!(error.message(), "HTTP 404 Not Found");
}

#[tokio::test]
async fn contributors_202_yields_empty_list() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/stats/contributors"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let stats = client.repositories().contributors("owner", "repo").await.unwrap();
    assert!(stats.is_empty());
}

#[tokio::test]
async fn contributors_200_is_decoded() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/stats/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "author": { "id": 1, "login": "dev" },
                "total": 42,
                "weeks": [ { "w": 1717200000, "a": 10, "d": 2, "c": 3 } ]
            }
        ])))
        .mount(&server)
        .await;

    let stats = client.repositories().contributors("owner", "repo").await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total, 42);
    assert_eq!(stats[0].author.as_ref().unwrap().login, "dev");
}

#[tokio::test]
async fn pagination_flags_derive_from_link_header_and_page_number() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    let link = format!(
        r#"<{}/repos/owner/repo/branches?page=2>; rel="next", <{}/repos/owner/repo/branches?page=4>; rel="last""#,
        server.uri(),
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/branches"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", link.as_str())
                .set_body_json(json!([
                    { "name": "main", "commit": { "sha": "abc", "url": "u" }, "protected": true }
                ])),
        )
        .mount(&server)
        .await;

    let first = client
        .repositories()
        .list_branches_page("owner", "repo", 1, 30)
        .await
        .unwrap();
    assert!(first.has_next());
    assert!(!first.has_prev());
    assert_eq!(first.links.total_pages(), Some(4));

    let second = client
        .repositories()
        .list_branches_page("owner", "repo", 2, 30)
        .await
        .unwrap();
    assert!(second.has_prev());
}

#[tokio::test]
async fn workflow_runs_envelope_is_unwrapped() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/actions/runs"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 128,
            "workflow_runs": [
                {
                    "id": 7,
                    "name": "CI",
                    "head_branch": "main",
                    "head_sha": "abc123",
                    "run_number": 42,
                    "event": "push",
                    "status": "completed",
                    "conclusion": "success",
                    "html_url": "https://github.com/owner/repo/actions/runs/7",
                    "created_at": "2024-06-01T10:00:00Z",
                    "updated_at": "2024-06-01T10:05:00Z"
                }
            ]
        })))
        .mount(&server)
        .await;

    let page = client
        .actions()
        .workflow_runs_page("owner", "repo", 1, 10)
        .await
        .unwrap();

    assert_eq!(page.total_count, Some(128));
    assert_eq!(page.len(), 1);
    assert_eq!(page.items[0].run_number, 42);
}

#[tokio::test]
async fn check_runs_envelope_is_unwrapped() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/commits/abc123/check-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "check_runs": [
                {
                    "id": 9,
                    "name": "build",
                    "status": "in_progress",
                    "conclusion": null,
                    "started_at": "2024-06-01T10:00:00Z",
                    "completed_at": null,
                    "html_url": "https://github.com/owner/repo/runs/9"
                }
            ]
        })))
        .mount(&server)
        .await;

    let checks = client.actions().check_runs("owner", "repo", "abc123").await.unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].name, "build");
}

#[tokio::test]
async fn open_pull_requests_are_listed_most_recently_updated_first() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/pulls"))
        .and(query_param("state", "open"))
        .and(query_param("sort", "updated"))
        .and(query_param("direction", "desc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([pull_request_json(1)])),
        )
        .mount(&server)
        .await;

    let prs = client.pull_requests().list_open("owner", "repo").await.unwrap();
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].number, 1);
}

#[tokio::test]
async fn closed_state_filter_is_passed_through() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/pulls"))
        .and(query_param("state", "closed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .pull_requests()
        .list_page("owner", "repo", StateFilter::Closed, 1, 20)
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn commit_files_default_to_empty_when_absent() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/commits/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sha": "huge" })))
        .mount(&server)
        .await;

    let files = client.commits().files("owner", "repo", "huge").await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn recent_commits_hydrate_first_five_and_degrade_on_failure() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    let shas: Vec<String> = (1..=10).map(|i| format!("c{}", i)).collect();
    let commits: Vec<serde_json::Value> = shas.iter().map(|s| commit_json(s)).collect();

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits))
        .mount(&server)
        .await;

    for sha in &shas[..5] {
        if sha == "c3" {
            // Detail for the third commit fails outright.
            Mock::given(method("GET"))
                .and(path(format!("/repos/owner/repo/commits/{}", sha)))
                .respond_with(
                    ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
                )
                .mount(&server)
                .await;
        } else {
            Mock::given(method("GET"))
                .and(path(format!("/repos/owner/repo/commits/{}", sha)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "sha": sha,
                    "files": [
                        {
                            "filename": "src/main.rs",
                            "status": "modified",
                            "additions": 3,
                            "deletions": 1,
                            "changes": 4
                        }
                    ]
                })))
                .mount(&server)
                .await;
        }
    }

    let paired = client
        .commits()
        .recent_with_files("owner", "repo")
        .await
        .unwrap();

    assert_eq!(paired.len(), 10);
    assert_eq!(paired[0].files.len(), 1);
    // The failed detail fetch degrades to empty files.
    assert!(paired[2].files.is_empty());
    // Commits past the hydration bound are never fetched.
    for entry in &paired[5..] {
        assert!(entry.files.is_empty());
    }
}

#[tokio::test]
async fn convenience_listings_use_default_page_sizes() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/commits"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([commit_json("c1")])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/actions/runs"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 0,
            "workflow_runs": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let commits = client.commits().list("owner", "repo").await.unwrap();
    assert_eq!(commits.len(), 1);

    let runs = client.actions().workflow_runs("owner", "repo").await.unwrap();
    assert!(runs.is_empty());
}

#[tokio::test]
async fn commit_search_is_scoped_to_the_repository() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/search/commits"))
        .and(query_param("q", "fix panic repo:owner/repo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [commit_json("abc")]
        })))
        .mount(&server)
        .await;

    let results = client
        .search()
        .commits("owner", "repo", "fix panic")
        .await
        .unwrap();

    assert_eq!(results.total_count, 1);
    assert_eq!(results.items[0].sha, "abc");
}

#[tokio::test]
async fn pull_request_search_hydrates_hits_and_drops_failures() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "login repo:owner/repo is:pr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "items": [
                { "number": 1, "title": "PR 1", "html_url": "https://github.com/owner/repo/pull/1" },
                { "number": 2, "title": "PR 2", "html_url": "https://github.com/owner/repo/pull/2" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/pulls/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pull_request_json(1)))
        .mount(&server)
        .await;
    // The second hit's hydration fails and is silently dropped.
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/pulls/2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let prs = client
        .search()
        .pull_requests("owner", "repo", "login")
        .await
        .unwrap();

    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].number, 1);
}

#[tokio::test]
async fn connection_failure_surfaces_as_network_error() {
    // A server that is already gone: connections are refused. A pooled
    // `MockServer::start()` keeps listening after drop, so use a dedicated
    // server that actually shuts down.
    let server = MockServer::builder().start().await;
    let uri = server.uri();
    drop(server);

    let client = GitHubClient::builder()
        .base_url(uri)
        .user_agent("gitpulse-tests/1.0")
        .retry(RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(50),
            multiplier: 2.0,
        })
        .build()
        .unwrap();

    let error = client.repositories().get("owner", "repo").await.unwrap_err();

    assert_eq!(*error.kind(), GitHubErrorKind::ConnectionFailed);
    assert!(std::error::Error::source(&error).is_some());
}
