mod common;

use assert2::{check, let_assert};
use common::{TrackerFixture, page, tracker};
use module_usage_tracker::access::AccessGuard;
use module_usage_tracker::cli::run_details;
use module_usage_tracker::tools::handle_module_details;
use module_usage_tracker::{DetailError, DetailRequest, DocumentId, get_details};
use rstest::rstest;

fn request(module: Option<&str>, security: Option<&str>) -> DetailRequest {
    DetailRequest {
        module: module.map(str::to_string),
        security: security.map(str::to_string),
    }
}

/// Test: A valid request lists every document using the module.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn details_list_pages_with_links(tracker: TrackerFixture) {
    let token = tracker.token();
    let result = get_details(&tracker.state, request(Some("block1"), Some(&token))).await;
    let_assert!(Ok(payload) = result);

    check!(payload.count == 3);
    check!(payload.unique_pages == 2);
    check!(payload.title.contains("<h3>Widget Usage Details</h3>"));
    check!(payload.title.contains("used 3 times across 2 unique posts"));

    let ids: Vec<DocumentId> = payload.pages.iter().map(|p| p.id).collect();
    check!(ids == [DocumentId::new(1), DocumentId::new(2)]);
    check!(payload.pages[0].title == "Page 1");
    check!(payload.pages[0].link == "/wp-admin/post.php?post=1&amp;action=edit");
}

/// Test: A registered but unused module succeeds with no pages.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn details_for_unused_module_are_empty(tracker: TrackerFixture) {
    let token = tracker.token();
    let_assert!(Ok(payload) = get_details(&tracker.state, request(Some("block2"), Some(&token))).await);

    check!(payload.count == 0);
    check!(payload.pages.is_empty());
    check!(payload.title.contains("used 0 times across 0 unique posts"));
}

/// Test: Missing or forged tokens are rejected before the corpus is touched.
#[rstest]
#[case::missing(None)]
#[case::forged(Some("0000000000000000"))]
#[case::garbage(Some("not-a-token"))]
#[tokio::test(flavor = "multi_thread")]
async fn details_reject_bad_token(tracker: TrackerFixture, #[case] security: Option<&str>) {
    let result = get_details(&tracker.state, request(Some("block1"), security)).await;

    check!(result == Err(DetailError::Unauthorized));
    check!(tracker.store.query_count() == 0);
}

/// Test: An operator without the required capability is rejected even with a valid token.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn details_require_capability() {
    let fixture = TrackerFixture::with_state([page(1, "[block1]")], &["block1"], |state| {
        state.with_access(AccessGuard::new("secret", ["edit_posts"]))
    });
    let token = fixture.token();
    let result = get_details(&fixture.state, request(Some("block1"), Some(&token))).await;

    check!(result == Err(DetailError::Unauthorized));
    check!(fixture.store.query_count() == 0);
}

/// Test: The token check runs before the module parameter check.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn token_checked_before_module(tracker: TrackerFixture) {
    let result = get_details(&tracker.state, request(None, None)).await;
    check!(result == Err(DetailError::Unauthorized));
}

/// Test: An absent or blank module parameter is reported without scanning.
#[rstest]
#[case::absent(None)]
#[case::empty(Some(""))]
#[case::blank(Some("   "))]
#[tokio::test(flavor = "multi_thread")]
async fn details_require_module(tracker: TrackerFixture, #[case] module: Option<&str>) {
    let token = tracker.token();
    let result = get_details(&tracker.state, request(module, Some(&token))).await;

    check!(result == Err(DetailError::MissingModuleParameter));
    check!(tracker.store.query_count() == 0);
}

/// Test: Unknown modules fail with close registry names as suggestions.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn details_unknown_module(tracker: TrackerFixture) {
    let token = tracker.token();
    let result = get_details(&tracker.state, request(Some("block3"), Some(&token))).await;

    let_assert!(Err(DetailError::ModuleNotFound { module, suggestions }) = result);
    check!(module == "block3");
    check!(suggestions.contains(&"block1".to_string()));
}

/// Test: The wire response is `{title, pages}` on success and `{error}` on failure.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wire_format(tracker: TrackerFixture) {
    let token = tracker.token();

    let_assert!(Ok(json) = handle_module_details(&tracker.state, request(Some("block1"), Some(&token))).await);
    let_assert!(Ok(value) = serde_json::from_str::<serde_json::Value>(&json));
    let_assert!(Some(object) = value.as_object());
    check!(object.len() == 2);
    check!(object["title"].is_string());
    check!(object["pages"][1] == serde_json::json!({
        "id": 2,
        "title": "Page 2",
        "link": "/wp-admin/post.php?post=2&amp;action=edit",
    }));

    let_assert!(Err(json) = handle_module_details(&tracker.state, request(Some("nope"), Some(&token))).await);
    check!(json == r#"{"error":"Module not found"}"#);

    let_assert!(Err(json) = handle_module_details(&tracker.state, request(Some("block1"), None)).await);
    check!(json == r#"{"error":"Unauthorized access"}"#);
}

/// Test: Unknown modules surface their suggestions on the wire and in CLI text.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_module_suggestions_are_shown(tracker: TrackerFixture) {
    let token = tracker.token();

    let_assert!(Err(json) = handle_module_details(&tracker.state, request(Some("block3"), Some(&token))).await);
    let_assert!(Ok(value) = serde_json::from_str::<serde_json::Value>(&json));
    check!(value["error"] == "Module not found");
    check!(value["suggestions"] == serde_json::json!(["block1", "block2"]));

    let_assert!(Err(text) = run_details(&tracker.state, "block3".to_string(), false).await);
    check!(text == "Module not found. Did you mean: block1, block2?");

    let_assert!(Err(json) = run_details(&tracker.state, "block3".to_string(), true).await);
    check!(json.contains(r#""suggestions":["block1","block2"]"#));

    let_assert!(Ok(listing) = run_details(&tracker.state, "block1".to_string(), false).await);
    check!(listing.contains("  - #1 Page 1: /wp-admin/post.php?post=1&action=edit"));
}

/// Test: Repeated lookups reuse the scan until the corpus changes.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scan_reused_until_corpus_changes(tracker: TrackerFixture) {
    let token = tracker.token();

    let_assert!(Ok(first) = get_details(&tracker.state, request(Some("block1"), Some(&token))).await);
    let queries_after_first = tracker.store.query_count();
    check!(queries_after_first == 2);

    let_assert!(Ok(second) = get_details(&tracker.state, request(Some("block2"), Some(&token))).await);
    check!(tracker.store.query_count() == queries_after_first);
    check!(first.count == 3);
    check!(second.count == 0);

    tracker.store.insert(page(3, "[block2] and [block1]"));
    let_assert!(Ok(third) = get_details(&tracker.state, request(Some("block2"), Some(&token))).await);
    check!(tracker.store.query_count() == queries_after_first * 2);
    check!(third.count == 1);
    check!(third.pages.iter().map(|p| p.id).collect::<Vec<_>>() == [DocumentId::new(3)]);
}

/// Test: With caching disabled every lookup rescans.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uncached_state_rescans() {
    let fixture = TrackerFixture::with_state([page(1, "[block1]")], &["block1"], |state| {
        state.with_cache(false)
    });
    let token = fixture.token();

    for _ in 0..2 {
        let_assert!(Ok(payload) = get_details(&fixture.state, request(Some("block1"), Some(&token))).await);
        check!(payload.count == 1);
    }
    check!(fixture.store.query_count() == 2);
}

/// Test: Concurrent lookups share a single scan.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_lookups_share_scan(tracker: TrackerFixture) {
    let token = tracker.token();
    let state = tracker.state.clone();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            let token = token.clone();
            tokio::spawn(async move {
                get_details(&state, request(Some("block1"), Some(&token))).await
            })
        })
        .collect();

    for task in tasks {
        let_assert!(Ok(Ok(payload)) = task.await);
        check!(payload.count == 3);
    }
    check!(tracker.store.query_count() == 2);
}
