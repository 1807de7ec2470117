use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repo_invest::analysis::{select_policy, InclusionFilters};
use repo_invest::github::{FetchConfig, FetchTermination, GitHubClient, RepositoryFetcher};
use repo_invest::models::repository::NO_README;
use repo_invest::models::FetchMode;

fn repo_json(name: &str, stars: u32, fork: bool) -> Value {
    json!({
        "name": name,
        "html_url": format!("https://github.com/octo/{}", name),
        "description": null,
        "language": "Rust",
        "stargazers_count": stars,
        "watchers_count": stars,
        "open_issues_count": 2,
        "fork": fork,
        "created_at": "2022-03-04T05:06:07Z",
        "updated_at": "2024-08-09T10:11:12Z"
    })
}

fn listing(range: std::ops::Range<u32>) -> Value {
    Value::Array(range.map(|i| repo_json(&format!("repo-{:02}", i), i, false)).collect())
}

fn listing_page(page: u32, body: Value) -> Mock {
    Mock::given(method("GET"))
        .and(path("/users/octo/repos"))
        .and(query_param("page", page.to_string()))
        .and(query_param("sort", "updated"))
        .and(query_param("direction", "desc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("x-ratelimit-remaining", "4999")
                .insert_header("x-ratelimit-reset", "4102444800"),
        )
}

async fn mount_plain_enrichment(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/repos/octo/[^/]+/readme$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/repos/octo/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": [] })))
        .mount(server)
        .await;
}

fn fetcher(server: &MockServer, per_page: u32) -> RepositoryFetcher {
    let client = GitHubClient::with_base_url(Some("test-token"), server.uri()).unwrap();
    let config = FetchConfig {
        per_page,
        item_delay: Duration::ZERO,
        page_delay: Duration::ZERO,
        concurrency: 1,
    };
    RepositoryFetcher::new(Arc::new(client), config)
}

#[tokio::test]
async fn recent_mode_requests_only_the_pages_it_needs() {
    let server = MockServer::start().await;
    listing_page(1, listing(0..10)).expect(1).mount(&server).await;
    listing_page(2, listing(10..20)).expect(1).mount(&server).await;
    listing_page(3, listing(20..30)).expect(0).mount(&server).await;
    mount_plain_enrichment(&server).await;

    let policy = select_policy(FetchMode::Recent, None, InclusionFilters::default());
    let outcome = fetcher(&server, 10).fetch("octo", &policy).await;

    assert_eq!(outcome.repositories.len(), 20);
    assert_eq!(outcome.pages_requested, 2);
    assert_eq!(outcome.termination, FetchTermination::CapReached);
    assert_eq!(outcome.repositories[0].description, "No description");
    assert_eq!(outcome.repositories[0].readme, NO_README);
}

#[tokio::test]
async fn forks_are_skipped_before_enrichment() {
    let server = MockServer::start().await;
    let body = json!([
        repo_json("original", 3, false),
        repo_json("forked", 30, true),
    ]);
    listing_page(1, body).expect(1).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/forked/readme"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;
    mount_plain_enrichment(&server).await;

    let filters = InclusionFilters {
        exclude_forks: true,
        min_stars: 0,
    };
    let policy = select_policy(FetchMode::All, None, filters);
    let outcome = fetcher(&server, 100).fetch("octo", &policy).await;

    let names: Vec<_> = outcome.repositories.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["original"]);
    assert_eq!(outcome.termination, FetchTermination::EndOfListing);
}

#[tokio::test]
async fn unknown_user_is_reported_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost/repos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;

    let policy = select_policy(FetchMode::Popular, None, InclusionFilters::default());
    let outcome = fetcher(&server, 100).fetch("ghost", &policy).await;

    assert!(outcome.repositories.is_empty());
    assert_eq!(outcome.termination, FetchTermination::UserNotFound);
}

#[tokio::test]
async fn failed_second_page_keeps_first_page() {
    let server = MockServer::start().await;
    listing_page(1, listing(0..5)).expect(1).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/octo/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;
    mount_plain_enrichment(&server).await;

    let policy = select_policy(FetchMode::Top20, None, InclusionFilters::default());
    let outcome = fetcher(&server, 5).fetch("octo", &policy).await;

    assert_eq!(outcome.repositories.len(), 5);
    assert!(outcome.is_partial());
    match outcome.termination {
        FetchTermination::RequestFailed(message) => assert!(message.contains("500")),
        other => panic!("unexpected termination: {:?}", other),
    }
}

#[tokio::test]
async fn enrichment_decodes_readme_and_topics() {
    let server = MockServer::start().await;
    listing_page(1, json!([repo_json("widget", 8, false), repo_json("gadget", 2, false)]))
        .mount(&server)
        .await;

    let encoded = STANDARD.encode("# Widget\n\nSells itself.");
    let wrapped = format!("{}\n{}\n", &encoded[..8], &encoded[8..]);
    Mock::given(method("GET"))
        .and(path("/repos/octo/widget/readme"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "content": wrapped, "encoding": "base64" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widget"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "topics": ["payments", "saas"] })),
        )
        .mount(&server)
        .await;
    // gadget: readme missing, details endpoint broken
    Mock::given(method("GET"))
        .and(path("/repos/octo/gadget/readme"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/gadget"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let policy = select_policy(FetchMode::All, None, InclusionFilters::default());
    let outcome = fetcher(&server, 100).fetch("octo", &policy).await;

    assert_eq!(outcome.repositories.len(), 2);
    let widget = &outcome.repositories[0];
    assert_eq!(widget.readme, "# Widget\n\nSells itself.");
    assert_eq!(widget.topics, vec!["payments", "saas"]);
    assert_eq!(widget.open_issues, 2);

    let gadget = &outcome.repositories[1];
    assert_eq!(gadget.readme, NO_README);
    assert!(gadget.topics.is_empty());
}

#[tokio::test]
async fn rate_limit_headers_reach_the_governor() {
    let server = MockServer::start().await;
    // Reset already in the past: warn, but never sleep.
    Mock::given(method("GET"))
        .and(path("/users/octo/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(0..1))
                .insert_header("x-ratelimit-remaining", "3")
                .insert_header("x-ratelimit-reset", "946684800"),
        )
        .mount(&server)
        .await;
    mount_plain_enrichment(&server).await;

    let fetcher = fetcher(&server, 100);
    let policy = select_policy(FetchMode::All, None, InclusionFilters::default());
    let outcome = fetcher.fetch("octo", &policy).await;

    assert_eq!(outcome.repositories.len(), 1);
    let snapshot = fetcher.governor().last_snapshot().await.unwrap();
    assert_eq!(snapshot.remaining, 3);
    assert_eq!(snapshot.reset.timestamp(), 946_684_800);
}
