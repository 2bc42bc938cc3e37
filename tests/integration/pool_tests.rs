//! Bounded pool runs with storage attached

use crate::{closed_port_url, mount_head, mount_page, test_config};
use page_lens::analyzer::HtmlVersion;
use page_lens::scheduler::SharedStorage;
use page_lens::storage::{SqliteStorage, Storage, UrlFilter};
use page_lens::{AnalysisPool, Analyzer, JobState};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pool_with_storage(max_concurrent: usize) -> (AnalysisPool, Arc<Mutex<SqliteStorage>>) {
    let analyzer = Arc::new(Analyzer::new(&test_config(5, 5)).unwrap());
    let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let shared: SharedStorage = storage.clone();
    let pool = AnalysisPool::new(analyzer, max_concurrent).with_storage(shared);
    (pool, storage)
}

async fn site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<!DOCTYPE html><title>Home</title><h1>Welcome</h1>
        <a href="/about">About</a><a href="/gone">Gone</a>"#,
    )
    .await;
    mount_page(
        server,
        "/about",
        r#"<!DOCTYPE html><title>About</title><h2>Team</h2>
        <form action="/signin"><input type="password" name="pw"></form>"#,
    )
    .await;
    mount_head(server, "/about", 200).await;
    mount_head(server, "/gone", 404).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pool_persists_every_outcome() {
    let server = MockServer::start().await;
    site(&server).await;
    let base = server.uri();

    let (pool, storage) = pool_with_storage(2);
    let home = pool.submit(&format!("{}/", base)).unwrap();
    let about = pool.submit(&format!("{}/about", base)).unwrap();
    let missing = pool.submit(&format!("{}/missing", base)).unwrap();
    let dead = pool.submit(&closed_port_url("/")).unwrap();
    assert_eq!(pool.len(), 4);
    let record_ids: Vec<i64> = [home, about, missing, dead]
        .iter()
        .map(|id| pool.record_id(*id).unwrap())
        .collect();

    let results = pool.wait_all().await;
    let ids: Vec<_> = results.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![home, about, missing, dead]);
    assert!(pool.is_empty());

    let states: Vec<JobState> = results
        .iter()
        .map(|(_, result)| JobState::for_result(result))
        .collect();
    assert_eq!(
        states,
        vec![
            JobState::Completed,
            JobState::Completed,
            JobState::Completed,
            JobState::Failed
        ]
    );

    let storage = storage.lock().unwrap();

    let record = storage.get_url(record_ids[0]).unwrap();
    assert_eq!(record.status, JobState::Completed);
    assert_eq!(record.status_code, 200);
    assert_eq!(record.html_version, HtmlVersion::Html5.as_str());
    assert_eq!(record.meta_title, "Home");
    assert_eq!(record.headings.tags(1), ["Welcome"]);
    assert_eq!(record.link_count, 2);
    assert_eq!(record.internal_links, 2);
    assert_eq!(record.broken_link_count, 1);
    assert_eq!(record.broken_links[0].url, format!("{}/gone", base));
    assert_eq!(record.broken_links[0].status_code, 404);
    assert!(record.analyzed_at.is_some());
    assert!(record.error_message.is_none());

    let record = storage.get_url(record_ids[1]).unwrap();
    assert!(record.has_login_form);
    assert_eq!(record.form_count, 1);
    assert_eq!(record.headings.count(2), 1);

    let record = storage.get_url(record_ids[2]).unwrap();
    assert_eq!(record.status, JobState::Completed);
    assert_eq!(record.status_code, 404);
    assert_eq!(record.error_message.as_deref(), Some("HTTP error: 404"));

    let record = storage.get_url(record_ids[3]).unwrap();
    assert_eq!(record.status, JobState::Failed);
    assert_eq!(record.status_code, 0);
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Failed to fetch URL"));

    let completed = storage
        .list_urls(&UrlFilter::default().with_status(JobState::Completed))
        .unwrap();
    assert_eq!(completed.len(), 3);
}

#[tokio::test]
async fn test_single_slot_pool_completes_all_jobs() {
    let server = MockServer::start().await;
    site(&server).await;
    let base = server.uri();

    let (pool, storage) = pool_with_storage(1);
    for _ in 0..3 {
        pool.submit(&format!("{}/about", base)).unwrap();
    }

    let results = pool.wait_all().await;
    assert_eq!(results.len(), 3);
    assert!(pool.is_empty());
    assert!(results
        .iter()
        .all(|(_, result)| result.meta_title == "About" && result.error_message.is_none()));

    // Re-submitting the same URL reuses its record
    let storage = storage.lock().unwrap();
    assert_eq!(storage.count_total().unwrap(), 1);
    assert_eq!(storage.count_by_status(JobState::Completed).unwrap(), 1);
}

#[tokio::test]
async fn test_resubmission_updates_stored_record() {
    let server = MockServer::start().await;
    site(&server).await;
    let target = format!("{}/", server.uri());

    let (pool, storage) = pool_with_storage(2);
    let first = pool.submit(&target).unwrap();
    pool.wait(first).await.unwrap();
    let first_record = pool.record_id(first).unwrap();

    let second = pool.submit(&target).unwrap();
    assert_ne!(first, second);
    pool.wait(second).await.unwrap();

    assert_eq!(pool.record_id(second), Some(first_record));
    let storage = storage.lock().unwrap();
    let record = storage.get_url_by_address(&target).unwrap().unwrap();
    assert_eq!(record.id, first_record);
    assert_eq!(record.status, JobState::Completed);
}

#[tokio::test]
async fn test_pool_with_database_file() {
    let server = MockServer::start().await;
    site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("analyses.db");

    {
        let analyzer = Arc::new(Analyzer::new(&test_config(5, 5)).unwrap());
        let shared: SharedStorage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).unwrap()));
        let pool = AnalysisPool::new(analyzer, 2).with_storage(shared);
        pool.submit(&format!("{}/about", server.uri())).unwrap();
        pool.wait_all().await;
    }

    let storage = SqliteStorage::new(&db_path).unwrap();
    let records = storage.list_urls(&UrlFilter::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, JobState::Completed);
    assert_eq!(records[0].meta_title, "About");
}

#[tokio::test]
async fn test_cancelled_pool_fails_queued_jobs() {
    let server = MockServer::start().await;
    site(&server).await;

    let (pool, storage) = pool_with_storage(1);
    pool.cancel_all();
    let id = pool.submit(&format!("{}/", server.uri())).unwrap();

    let result = pool.wait(id).await.unwrap();
    assert_eq!(result.status_code, 0);
    assert_eq!(result.error_message.as_deref(), Some("Analysis cancelled"));
    assert_eq!(pool.status(id), Some(JobState::Failed));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());

    let storage = storage.lock().unwrap();
    assert_eq!(storage.count_by_status(JobState::Failed).unwrap(), 1);
}

#[tokio::test]
async fn test_pool_caps_concurrent_analyses() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(400);
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<title>Slow</title>")
                .insert_header("content-type", "text/html")
                .set_delay(delay),
        )
        .expect(4)
        .mount(&server)
        .await;

    let analyzer = Arc::new(Analyzer::new(&test_config(5, 5)).unwrap());
    let pool = AnalysisPool::new(analyzer, 2);
    let target = format!("{}/slow", server.uri());

    let started = Instant::now();
    for _ in 0..4 {
        pool.submit(&target).unwrap();
    }
    let results = pool.wait_all().await;
    let elapsed = started.elapsed();

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(_, r)| r.meta_title == "Slow"));
    // Two slots for four jobs means at least two delay periods back to back
    assert!(
        elapsed >= delay * 2,
        "four jobs on two slots finished in {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_long_lived_pool_does_not_retain_finished_jobs() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<title>Again</title>").await;

    let analyzer = Arc::new(Analyzer::new(&test_config(5, 5)).unwrap());
    let pool = AnalysisPool::new(analyzer, 4);

    for _ in 0..3 {
        for _ in 0..10 {
            pool.submit(&server.uri()).unwrap();
        }
        assert_eq!(pool.wait_all().await.len(), 10);
        assert_eq!(pool.len(), 0);
    }

    let id = pool.submit(&server.uri()).unwrap();
    pool.wait(id).await.unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.take(id).unwrap().meta_title, "Again");
    assert!(pool.is_empty());
}
