//! Broken-link probing through full analyses

use crate::{closed_port_url, mount_head, mount_page, test_analyzer, test_config};
use page_lens::analyzer::{build_http_client, probe_links};
use page_lens::config::UserAgentConfig;
use page_lens::{Analyzer, JobState};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_slow_head(server: &MockServer, route: &str, status: u16, delay: Duration) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_broken_links_keep_document_order() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/slow">1</a><a href="/fast">2</a><a href="/ok">3</a><a href="/mid">4</a>"#,
    )
    .await;
    mount_slow_head(&server, "/slow", 500, Duration::from_millis(300)).await;
    mount_head(&server, "/fast", 404).await;
    mount_head(&server, "/ok", 200).await;
    mount_slow_head(&server, "/mid", 503, Duration::from_millis(100)).await;

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();

    let base = server.uri();
    let broken: Vec<(String, u16)> = result
        .broken_links
        .iter()
        .map(|b| (b.url.clone(), b.status_code))
        .collect();
    assert_eq!(
        broken,
        vec![
            (format!("{}/slow", base), 500),
            (format!("{}/fast", base), 404),
            (format!("{}/mid", base), 503),
        ]
    );
    assert!(result.broken_links.iter().all(|b| b.error.is_none()));
    assert!(result.error_message.is_none());
}

#[tokio::test]
async fn test_only_sampled_prefix_is_probed() {
    let server = MockServer::start().await;
    let anchors: String = (0..15)
        .map(|i| format!(r#"<a href="/l{}">link {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", anchors)).await;

    for i in 0..15 {
        Mock::given(method("HEAD"))
            .and(path(format!("/l{}", i)))
            .respond_with(ResponseTemplate::new(if i < 10 { 200 } else { 404 }))
            .expect(if i < 10 { 1 } else { 0 })
            .mount(&server)
            .await;
    }

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();

    assert_eq!(result.total_link_count, 15);
    assert_eq!(result.internal_link_count, 15);
    assert!(result.broken_links.is_empty());
}

#[tokio::test]
async fn test_unreachable_link_reports_status_zero() {
    let server = MockServer::start().await;
    let dead = closed_port_url("/gone");
    mount_page(&server, "/", &format!(r#"<a href="{}">dead</a>"#, dead)).await;

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();

    assert_eq!(result.broken_links.len(), 1);
    assert_eq!(result.broken_links[0].url, dead);
    assert_eq!(result.broken_links[0].status_code, 0);
    assert!(result.broken_links[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("connection failed"));
}

#[tokio::test]
async fn test_probe_timeout_is_independent_of_fetch_timeout() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/stall">stall</a>"#).await;
    mount_slow_head(&server, "/stall", 200, Duration::from_secs(3)).await;

    let analyzer = Analyzer::new(&test_config(10, 1)).unwrap();
    let result = analyzer.analyze(&server.uri()).await.unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(result.broken_links.len(), 1);
    assert_eq!(result.broken_links[0].status_code, 0);
    assert_eq!(
        result.broken_links[0].error.as_deref(),
        Some("request timed out after 1s")
    );
}

#[tokio::test]
async fn test_cancel_during_probes_keeps_page_metrics() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<title>Probing</title><a href="/a">a</a><a href="/b">b</a>"#,
    )
    .await;
    mount_slow_head(&server, "/a", 404, Duration::from_secs(5)).await;
    mount_slow_head(&server, "/b", 404, Duration::from_secs(5)).await;

    let analyzer = Arc::new(Analyzer::new(&test_config(10, 10)).unwrap());
    let cancel = CancellationToken::new();

    let task = {
        let analyzer = Arc::clone(&analyzer);
        let cancel = cancel.clone();
        let target = server.uri();
        tokio::spawn(async move { analyzer.analyze_with_cancel(&target, &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(3), task)
        .await
        .expect("analysis did not stop after cancellation")
        .unwrap()
        .unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(result.meta_title, "Probing");
    assert_eq!(result.total_link_count, 2);
    assert!(result.broken_links.is_empty());
    assert_eq!(result.error_message.as_deref(), Some("Analysis cancelled"));
    assert_eq!(JobState::for_result(&result), JobState::Completed);
}

#[tokio::test]
async fn test_probe_links_directly() {
    let server = MockServer::start().await;
    mount_head(&server, "/up", 204).await;
    mount_head(&server, "/down", 410).await;

    let client = build_http_client(&UserAgentConfig::default()).unwrap();
    let links: Vec<Url> = ["/up", "/down", "/down"]
        .iter()
        .map(|route| Url::parse(&format!("{}{}", server.uri(), route)).unwrap())
        .collect();

    let report = probe_links(
        &client,
        &links,
        10,
        Duration::from_secs(5),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(report.probed, 3);
    assert!(!report.cancelled);
    assert_eq!(report.broken.len(), 2);
    assert!(report.broken.iter().all(|b| b.status_code == 410));
}
