//! Interactive browsing sessions fed from scripted input.

use std::sync::Arc;
use std::time::Duration;

use policyhub_cli::browse::Browser;
use policyhub_cli::render::Style;
use policyhub_client::MockCatalog;
use policyhub_model::{Policy, ViewMode};
use policyhub_state::{AppContext, FilterLocation};
use tokio::io::{AsyncWriteExt, BufReader};

fn catalog() -> Arc<MockCatalog> {
    let policies = ["cors", "jwt", "rate-limit"].map(|name| {
        let mut policy = Policy::new(name, "1.0", "WSO2");
        policy.is_latest = true;
        policy.categories = vec!["security".to_string()];
        policy
    });
    Arc::new(MockCatalog::new().with_policies(policies))
}

fn style() -> Style {
    Style::plain().with_view_mode(ViewMode::List)
}

fn searches(catalog: &MockCatalog) -> Vec<String> {
    catalog
        .list_requests()
        .into_iter()
        .filter_map(|params| params.search)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn burst_of_typing_commits_once() {
    let catalog = catalog();
    let ctx = AppContext::new(catalog.clone());
    let mut out = Vec::new();
    let mut notices = Vec::new();

    let mut browser = Browser::new(
        &ctx,
        style(),
        FilterLocation::parse("/policies?page=3"),
        &mut out,
        &mut notices,
    );
    let last = browser
        .run("j\njw\njwt\n".as_bytes())
        .await
        .expect("session");

    assert_eq!(last.href(), "/policies?search=jwt");
    assert_eq!(searches(&catalog), vec!["jwt"]);
    let out = String::from_utf8(out).expect("utf8");
    assert_eq!(out.matches("Location: ").count(), 2);
    assert!(out.trim_end().ends_with("Location: /policies?search=jwt"));
}

#[tokio::test(start_paused = true)]
async fn pauses_longer_than_the_delay_commit_each_word() {
    let catalog = catalog();
    let ctx = AppContext::new(catalog.clone());
    let (reader, mut writer) = tokio::io::duplex(256);
    tokio::spawn(async move {
        for (line, pause) in [("co\n", 100), ("cor\n", 500), ("rate\n", 500), (":quit\n", 0)] {
            writer.write_all(line.as_bytes()).await.expect("write");
            tokio::time::sleep(Duration::from_millis(pause)).await;
        }
    });

    let mut out = Vec::new();
    let mut browser = Browser::new(
        &ctx,
        style(),
        FilterLocation::parse("/policies"),
        &mut out,
        std::io::sink(),
    );
    let last = browser.run(BufReader::new(reader)).await.expect("session");

    assert_eq!(searches(&catalog), vec!["cor", "rate"]);
    assert_eq!(last.href(), "/policies?search=rate");
}

#[tokio::test(start_paused = true)]
async fn commands_rewrite_the_location() {
    let catalog = catalog();
    let ctx = AppContext::new(catalog.clone());
    let mut out = Vec::new();
    let mut notices = Vec::new();
    let script = ":category security\n:page 2\n:size 5\n:bogus\n:category security\n";

    let mut browser = Browser::new(
        &ctx,
        style(),
        FilterLocation::parse("/policies"),
        &mut out,
        &mut notices,
    );
    let last = browser.run(script.as_bytes()).await.expect("session");

    let out = String::from_utf8(out).expect("utf8");
    let locations: Vec<&str> = out
        .lines()
        .filter_map(|line| line.strip_prefix("Location: "))
        .collect();
    assert_eq!(
        locations,
        vec![
            "/policies",
            "/policies?categories=security",
            "/policies?categories=security&page=2",
            "/policies?categories=security&pageSize=5",
            "/policies?pageSize=5",
        ]
    );
    assert_eq!(last.href(), "/policies?pageSize=5");
    let notices = String::from_utf8(notices).expect("utf8");
    assert_eq!(notices, "unknown command: :bogus (type :help)\n");
}

#[tokio::test(start_paused = true)]
async fn reset_drops_filters_and_pending_search() {
    let catalog = catalog();
    let ctx = AppContext::new(catalog.clone());
    let mut out = Vec::new();

    let mut browser = Browser::new(
        &ctx,
        style(),
        FilterLocation::parse("/policies?search=cors&providers=WSO2"),
        &mut out,
        std::io::sink(),
    );
    let last = browser
        .run("jw\n:reset\n".as_bytes())
        .await
        .expect("session");

    assert_eq!(last.href(), "/policies");
    assert!(searches(&catalog).iter().all(|search| search == "cors"));
}
