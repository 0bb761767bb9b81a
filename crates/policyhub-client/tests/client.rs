//! HTTP behaviour of `PolicyHubClient` against a scripted local server.

use std::time::Duration;

use insta::assert_snapshot;
use policyhub_client::{CatalogApi, ClientConfig, PolicyHubClient};
use policyhub_model::{DocsPage, FilterState, VersionListParams};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serves one connection with a canned response and reports the request line.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = vec![0_u8; 8192];
        let n = socket.read(&mut buf).await.expect("read");
        let request = String::from_utf8_lossy(&buf[..n]).to_string();
        let _ = tx.send(request);
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
    });
    (base_url, rx)
}

fn client(base_url: &str) -> PolicyHubClient {
    PolicyHubClient::new(ClientConfig::default().with_base_url(base_url)).expect("client")
}

fn request_target(request: &str) -> String {
    request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

const POLICY_BODY: &str = r#"{"success":true,"data":{"name":"cors","version":"2.0.0","displayName":"CORS","provider":"WSO2","isLatest":true},"meta":{"trace_id":"t","timestamp":"now","request_id":"r"}}"#;

#[tokio::test]
async fn summary_unwraps_envelope() {
    let (base, rx) = serve_once("200 OK", "application/json", POLICY_BODY).await;
    let policy = client(&base).policy_summary("cors").await.expect("policy");
    assert_eq!(policy.version, "2.0.0");
    assert!(policy.is_latest);
    let request = rx.await.expect("request");
    assert_eq!(request_target(&request), "/policies/cors");
    assert!(request.to_lowercase().contains("accept: application/json"));
}

#[tokio::test]
async fn not_found_body_keeps_server_code() {
    let (base, _rx) = serve_once(
        "404 Not Found",
        "application/json",
        r#"{"error":{"code":"POLICY_NOT_FOUND","message":"not found"}}"#,
    )
    .await;
    let err = client(&base).policy_summary("foo").await.unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.code, "POLICY_NOT_FOUND");
    assert_eq!(err.message, "not found");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unstructured_failure_becomes_http_error() {
    let (base, _rx) = serve_once("503 Service Unavailable", "text/plain", "down").await;
    let err = client(&base).categories().await.unwrap_err();
    assert_eq!(err.status, 503);
    assert_eq!(err.code, "HTTP_ERROR");
    assert_snapshot!(err.message, @"HTTP 503: Service Unavailable");
}

#[tokio::test]
async fn invalid_success_body_is_unknown_error() {
    let (base, _rx) = serve_once("200 OK", "application/json", "{not json").await;
    let err = client(&base).providers().await.unwrap_err();
    assert_eq!(err.status, 500);
    assert_eq!(err.code, "UNKNOWN_ERROR");
}

#[tokio::test]
async fn list_sends_filters_in_fixed_order() {
    let body = r#"{"success":true,"data":[],"meta":{"trace_id":"","timestamp":"","request_id":"","pagination":{"page":2,"pageSize":20,"totalItems":21,"totalPages":2}}}"#;
    let (base, rx) = serve_once("200 OK", "application/json", body).await;
    let filters = FilterState::from_query("categories=security&page=2");
    let page = client(&base)
        .list_policies(&filters.to_list_params())
        .await
        .expect("page");
    assert_eq!(page.pagination.total_items, 21);
    let request = rx.await.expect("request");
    assert_snapshot!(request_target(&request), @"/policies?categories=security&page=2&pageSize=20");
}

#[tokio::test]
async fn version_list_requests_full_page() {
    let body = r#"{"success":true,"data":[],"meta":{"pagination":{"page":1,"pageSize":100,"totalItems":0,"totalPages":0}}}"#;
    let (base, rx) = serve_once("200 OK", "application/json", body).await;
    client(&base)
        .list_versions("jwt auth", VersionListParams::all())
        .await
        .expect("versions");
    let request = rx.await.expect("request");
    assert_eq!(
        request_target(&request),
        "/policies/jwt%20auth/versions?pageSize=100"
    );
}

#[tokio::test]
async fn definition_is_raw_text() {
    let (base, rx) = serve_once("200 OK", "text/yaml", "name: cors\nversion: 2.0.0\n").await;
    let yaml = client(&base).definition("cors", "2.0.0").await.expect("definition");
    assert_eq!(yaml, "name: cors\nversion: 2.0.0\n");
    let request = rx.await.expect("request");
    assert_eq!(
        request_target(&request),
        "/policies/cors/versions/2.0.0/definition"
    );
    assert!(request.to_lowercase().contains("accept: text/yaml"));
}

#[tokio::test]
async fn doc_page_parses() {
    let body = r##"{"success":true,"data":{"page":"faq","format":"markdown","content":"# FAQ"},"meta":{}}"##;
    let (base, rx) = serve_once("200 OK", "application/json", body).await;
    let doc = client(&base)
        .doc_page("cors", "2.0.0", DocsPage::Faq)
        .await
        .expect("doc");
    assert_eq!(doc.content, "# FAQ");
    let request = rx.await.expect("request");
    assert_eq!(
        request_target(&request),
        "/policies/cors/versions/2.0.0/docs/faq"
    );
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{addr}")).health().await.unwrap_err();
    assert_eq!(err.status, 0);
    assert_eq!(err.code, "NETWORK_ERROR");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let config = ClientConfig::default()
        .with_base_url(base)
        .with_timeout(Duration::from_millis(200));
    let err = PolicyHubClient::new(config)
        .expect("client")
        .health()
        .await
        .unwrap_err();
    assert_eq!(err.status, 408);
    assert_eq!(err.code, "TIMEOUT");
}

#[tokio::test]
async fn prefetch_ignores_failures() {
    let (base, _rx) = serve_once("200 OK", "application/json", POLICY_BODY).await;
    // The responder serves a single connection, so one of the two fetches fails.
    let loaded = client(&base).prefetch_policies(&["cors", "jwt"]).await;
    assert_eq!(loaded, 1);
}

#[test]
fn asset_urls_are_templated_without_requests() {
    let client = client("http://hub.local/");
    assert_eq!(
        client.asset_url("rate limit", "1.0", "logo.svg"),
        "http://hub.local/assets/rate%20limit/1.0/logo.svg"
    );
    assert_eq!(
        client.global_asset_url("banner/main.png"),
        "http://hub.local/assets/global/banner%2Fmain.png"
    );
}
