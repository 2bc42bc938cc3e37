//! End-to-end analyses of single pages

use crate::{closed_port_url, mount_head, mount_page, test_analyzer, test_config};
use page_lens::analyzer::HtmlVersion;
use page_lens::{Analyzer, AnalyzerError, JobState};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_error_status_stops_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not found</h1>"))
        .mount(&server)
        .await;

    let result = test_analyzer()
        .analyze(&format!("{}/missing", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status_code, 404);
    assert_eq!(result.error_message.as_deref(), Some("HTTP error: 404"));
    assert!(result.load_time_seconds > 0.0);
    assert!(result.html_version.is_none());
    assert_eq!(result.heading_count(1), 0);
    assert_eq!(result.total_link_count, 0);
    assert_eq!(result.image_count, 0);
    assert_eq!(result.form_count, 0);
    assert_eq!(result.page_size_bytes, 0);
    assert_eq!(JobState::for_result(&result), JobState::Completed);
}

#[tokio::test]
async fn test_empty_heading_is_not_counted() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<!DOCTYPE html><html><body><h1>Home</h1><h1></h1><h2>   </h2></body></html>",
    )
    .await;

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();

    assert_eq!(result.heading_tags(1), ["Home"]);
    assert_eq!(result.heading_count(1), 1);
    assert_eq!(result.heading_count(2), 0);
    assert!(result.error_message.is_none());
}

#[tokio::test]
async fn test_login_form_detected_via_action_keyword() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
        <form action="/search"><input type="text" name="q"></form>
        <form action="/login"><input type="password" name="secret"></form>
        </body></html>"#,
    )
    .await;

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();

    assert_eq!(result.form_count, 2);
    assert!(result.has_login_form);
}

#[tokio::test]
async fn test_malformed_target_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let err = test_analyzer().analyze("not a url").await.unwrap_err();

    assert!(matches!(err, AnalyzerError::InvalidUrl(_)));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_full_page_analysis() {
    let server = MockServer::start().await;
    let base = server.uri();
    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>  Acme Widgets  </title>
  <meta property="og:description" content="Widgets for everyone">
</head>
<body>
  <h1>Acme</h1>
  <h2>Products</h2><h2>Support</h2>
  <h3>FAQ</h3>
  <img src="/logo.png"><img src="/hero.jpg"><img>
  <a href="/products">Products</a>
  <a href="support">Support</a>
  <a href="{base}/about">About</a>
  <a href="https://external.example/">Partner</a>
  <a href="mailto:sales@acme.example">Mail</a>
  <a href="javascript:void(0)">Menu</a>
  <a href="">Empty</a>
  <a>No href</a>
</body>
</html>"#
    );
    mount_page(&server, "/", &body).await;
    for route in ["/products", "/support", "/about"] {
        mount_head(&server, route, 200).await;
    }

    // Probes of the unresolvable host and the hostless schemes fail and are
    // reported, not raised
    let result = test_analyzer().analyze(&base).await.unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(result.html_version, Some(HtmlVersion::Html5));
    assert_eq!(result.meta_title, "Acme Widgets");
    assert_eq!(result.meta_description, "Widgets for everyone");
    assert_eq!(result.heading_tags(2), ["Products", "Support"]);
    assert_eq!(result.heading_count(3), 1);
    assert_eq!(result.image_count, 3);
    assert_eq!(result.total_link_count, 6);
    assert_eq!(result.internal_link_count, 3);
    assert_eq!(result.external_link_count, 1);
    assert_eq!(result.page_size_bytes, body.len() as u64);
    assert!(!result.has_login_form);

    let broken: Vec<&str> = result.broken_links.iter().map(|b| b.url.as_str()).collect();
    assert_eq!(
        broken,
        [
            "https://external.example/",
            "mailto:sales@acme.example",
            "javascript:void(0)"
        ]
    );
    assert!(result
        .broken_links
        .iter()
        .all(|b| b.status_code == 0 && b.error.is_some()));
    assert!(result.error_message.is_none());
}

#[tokio::test]
async fn test_other_host_spelling_is_external() {
    let server = MockServer::start().await;
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();
    mount_page(
        &server,
        "/",
        &format!(r#"<a href="http://localhost:{}/x">same server, other host</a>"#, port),
    )
    .await;

    let config = test_config(5, 5);
    let analyzer = Analyzer::new(&page_lens::Config {
        analyzer: page_lens::config::AnalyzerConfig {
            sample_limit: 0,
            ..config.analyzer
        },
        ..config
    })
    .unwrap();
    let result = analyzer.analyze(&server.uri()).await.unwrap();

    assert_eq!(result.total_link_count, 1);
    assert_eq!(result.internal_link_count, 0);
    assert_eq!(result.external_link_count, 1);
}

#[tokio::test]
async fn test_xhtml_strict_doctype() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Old</title></head><body></body></html>"#,
    )
    .await;

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();

    assert_eq!(result.html_version, Some(HtmlVersion::Xhtml10Strict));
    assert_eq!(result.meta_title, "Old");
}

#[tokio::test]
async fn test_html5_doctype_with_irregular_spacing() {
    let server = MockServer::start().await;
    mount_page(&server, "/spaced", "<!DOCTYPE  html ><html><title>Spaced</title></html>").await;

    let result = test_analyzer()
        .analyze(&format!("{}/spaced", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.html_version, Some(HtmlVersion::Html5));
    assert_eq!(result.meta_title, "Spaced");
}

#[tokio::test]
async fn test_binary_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d])
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;

    let result = test_analyzer()
        .analyze(&format!("{}/logo.png", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status_code, 200);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Failed to parse HTML"));
    assert!(result.html_version.is_none());
    assert!(result.load_time_seconds > 0.0);
    assert_eq!(JobState::for_result(&result), JobState::Completed);
}

#[tokio::test]
async fn test_unreachable_target_is_full_failure() {
    let result = test_analyzer()
        .analyze(&closed_port_url("/"))
        .await
        .unwrap();

    assert_eq!(result.status_code, 0);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Failed to fetch URL"));
    assert_eq!(result.load_time_seconds, 0.0);
    assert_eq!(JobState::for_result(&result), JobState::Failed);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let analyzer = Analyzer::new(&test_config(1, 1)).unwrap();
    let result = analyzer
        .analyze(&format!("{}/slow", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status_code, 0);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Failed to fetch URL: request timed out after 1s")
    );
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<title>Moved</title>").await;

    let result = test_analyzer()
        .analyze(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(result.meta_title, "Moved");
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>UA</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_analyzer().analyze(&server.uri()).await.unwrap();
    assert_eq!(result.meta_title, "UA");
}
