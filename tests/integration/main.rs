//! Integration tests for the page analyzer
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! analyses end-to-end, both directly and through the analysis pool.

mod analyze_tests;
mod pool_tests;
mod probe_tests;

use page_lens::config::{AnalyzerConfig, Config, UserAgentConfig};
use page_lens::Analyzer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given timeouts (seconds)
pub fn test_config(fetch_timeout_secs: u64, probe_timeout_secs: u64) -> Config {
    Config {
        analyzer: AnalyzerConfig {
            fetch_timeout_secs,
            probe_timeout_secs,
            sample_limit: 10,
            max_concurrent_analyses: 2,
        },
        user_agent: UserAgentConfig {
            name: "TestBot".to_string(),
            version: "1.0.0".to_string(),
            contact_url: None,
        },
        ..Default::default()
    }
}

/// Creates an analyzer with short timeouts
pub fn test_analyzer() -> Analyzer {
    Analyzer::new(&test_config(5, 5)).expect("Failed to build analyzer")
}

/// Serves `html` for GET requests to `route`
pub async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Answers HEAD requests to `route` with `status`
pub async fn mount_head(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Returns a URL on a local port nothing listens on
pub fn closed_port_url(route: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, route)
}
