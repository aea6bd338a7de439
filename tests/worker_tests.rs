// Worker lifecycle, eviction and message protocol tests

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use serde_json::json;
use swcache::cache::{CacheStorage, StoredResponse};
use swcache::config::{CacheConfig, UpstreamConfig, LEGACY_PARTITION};
use swcache::error::WorkerError;
use swcache::net::NetworkClient;
use swcache::request::FetchRequest;
use swcache::worker::{CacheWorker, FetchOutcome};
use url::Url;

fn worker_for(origin: &str, config: CacheConfig, storage: CacheStorage) -> CacheWorker {
    let client = NetworkClient::new(&UpstreamConfig::default()).unwrap();
    CacheWorker::new(config, Url::parse(origin).unwrap(), storage, client)
}

fn bare_config() -> CacheConfig {
    CacheConfig {
        static_precache: vec![],
        dynamic_precache: vec![],
        ..CacheConfig::default()
    }
}

fn ok_response(body: &str) -> StoredResponse {
    StoredResponse::new(
        StatusCode::OK,
        HeaderMap::new(),
        Bytes::copy_from_slice(body.as_bytes()),
    )
}

fn unreachable(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

async fn fill_dynamic(worker: &CacheWorker, count: usize) {
    let partition = worker.config().dynamic_partition.clone();
    for i in 0..count {
        worker
            .storage()
            .put(
                &partition,
                &format!("GET https://example.com/resource-{:02}", i),
                ok_response("body"),
            )
            .await;
    }
}

#[tokio::test]
async fn install_precaches_static_assets() {
    let mut server = mockito::Server::new_async().await;
    let logo = server
        .mock("GET", "/images/KARF7_LOGO.png")
        .with_status(200)
        .with_body("png bytes")
        .create_async()
        .await;
    let manifest = server
        .mock("GET", "/manifest.json")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let storage = CacheStorage::new();
    let config = CacheConfig {
        dynamic_precache: vec![],
        ..CacheConfig::default()
    };
    let worker = worker_for(&server.url(), config.clone(), storage.clone());

    worker.install().await.unwrap();

    assert_eq!(storage.entry_count(&config.static_partition).await, 2);
    logo.assert_async().await;
    manifest.assert_async().await;
}

#[tokio::test]
async fn install_fails_when_a_static_asset_is_missing() {
    let mut server = mockito::Server::new_async().await;
    // Only the manifest is deployed; the logo path 404s.
    let _manifest = server
        .mock("GET", "/manifest.json")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _logo = server
        .mock("GET", "/images/KARF7_LOGO.png")
        .with_status(404)
        .create_async()
        .await;

    let config = CacheConfig {
        dynamic_precache: vec![],
        ..CacheConfig::default()
    };
    let worker = worker_for(&server.url(), config, CacheStorage::new());

    let err = worker.install().await.unwrap_err();
    assert!(matches!(err, WorkerError::Precache(_)));
}

#[tokio::test]
async fn install_tolerates_individual_dynamic_precache_failures() {
    let mut server = mockito::Server::new_async().await;
    let _hero = server
        .mock("GET", "/hero.jpeg")
        .with_status(200)
        .with_body("jpeg bytes")
        .create_async()
        .await;

    let storage = CacheStorage::new();
    let config = CacheConfig {
        static_precache: vec![],
        dynamic_precache: vec![
            format!("{}/hero.jpeg", server.url()),
            unreachable("/fonts.css"),
            "not a url at all".to_string(),
        ],
        ..CacheConfig::default()
    };
    let worker = worker_for(&server.url(), config.clone(), storage.clone());

    // One failed asset does not abort the others, or the install.
    worker.install().await.unwrap();
    assert_eq!(storage.entry_count(&config.dynamic_partition).await, 1);
}

#[tokio::test]
async fn activation_deletes_every_stale_partition() {
    let storage = CacheStorage::new();
    let config = bare_config();

    storage.open(&config.static_partition).await;
    storage.put(&config.dynamic_partition, "k", ok_response("x")).await;
    // The legacy combined partition and a previous version both linger.
    storage.open(LEGACY_PARTITION).await;
    storage.put("karf7-dynamic-v0.9.0", "k", ok_response("y")).await;

    let worker = worker_for("http://127.0.0.1:3000", config.clone(), storage.clone());
    worker.activate().await;

    let mut names = storage.partition_names().await;
    names.sort();
    let mut expected = vec![config.static_partition.clone(), config.dynamic_partition.clone()];
    expected.sort();
    assert_eq!(names, expected);
    // Current partitions keep their contents.
    assert!(storage.match_entry(&config.dynamic_partition, "k").await.is_some());
}

#[tokio::test]
async fn eviction_pass_keeps_the_most_recently_inserted_entries() {
    let storage = CacheStorage::new();
    let config = bare_config();
    let worker = worker_for("http://127.0.0.1:3000", config.clone(), storage.clone());

    fill_dynamic(&worker, 60).await;
    let removed = worker.clean_dynamic_cache().await;

    assert_eq!(removed, 10);
    assert_eq!(storage.entry_count(&config.dynamic_partition).await, 50);
    let remaining = storage
        .identities_by_insertion(&config.dynamic_partition)
        .await;
    let expected: Vec<String> = (10..60)
        .map(|i| format!("GET https://example.com/resource-{:02}", i))
        .collect();
    assert_eq!(remaining, expected);
}

#[tokio::test]
async fn eviction_pass_is_a_noop_below_the_ceiling() {
    let storage = CacheStorage::new();
    let config = bare_config();
    let worker = worker_for("http://127.0.0.1:3000", config.clone(), storage.clone());

    fill_dynamic(&worker, 50).await;
    assert_eq!(worker.clean_dynamic_cache().await, 0);
    assert_eq!(storage.entry_count(&config.dynamic_partition).await, 50);
}

#[tokio::test]
async fn clean_cache_message_triggers_eviction() {
    let storage = CacheStorage::new();
    let config = bare_config();
    let worker = worker_for("http://127.0.0.1:3000", config.clone(), storage.clone());

    fill_dynamic(&worker, 60).await;
    worker.handle_message(&json!({ "type": "CLEAN_CACHE" })).await;

    assert_eq!(storage.entry_count(&config.dynamic_partition).await, 50);
}

#[tokio::test]
async fn unrecognized_messages_are_ignored() {
    let storage = CacheStorage::new();
    let config = bare_config();
    let worker = worker_for("http://127.0.0.1:3000", config.clone(), storage.clone());

    fill_dynamic(&worker, 60).await;
    worker.handle_message(&json!({ "type": "PURGE_EVERYTHING" })).await;
    worker.handle_message(&json!({ "command": "CLEAN_CACHE" })).await;
    worker.handle_message(&json!(42)).await;

    assert_eq!(storage.entry_count(&config.dynamic_partition).await, 60);
}

#[tokio::test]
async fn non_get_requests_pass_through() {
    let storage = CacheStorage::new();
    let worker = worker_for("http://127.0.0.1:3000", bare_config(), storage.clone());

    let req = FetchRequest::new(
        Method::POST,
        Url::parse("http://127.0.0.1:3000/api/contact").unwrap(),
    );
    let outcome = worker.handle_fetch(&req).await;

    assert!(matches!(outcome, FetchOutcome::PassThrough));
    assert_eq!(storage.entry_count(&worker.config().dynamic_partition).await, 0);
}

#[tokio::test]
async fn extension_scheme_requests_pass_through() {
    let storage = CacheStorage::new();
    let worker = worker_for("http://127.0.0.1:3000", bare_config(), storage.clone());

    let req = FetchRequest::get(Url::parse("chrome-extension://abcdef/content.js").unwrap());
    let outcome = worker.handle_fetch(&req).await;

    assert!(matches!(outcome, FetchOutcome::PassThrough));
}

#[tokio::test]
async fn navigations_are_served_network_first() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>fresh</html>")
        .expect(1)
        .create_async()
        .await;

    let storage = CacheStorage::new();
    let config = bare_config();
    let worker = worker_for(&server.url(), config.clone(), storage.clone());

    let req = FetchRequest::get(Url::parse(&format!("{}/", server.url())).unwrap())
        .with_mode("navigate");
    // A stale document sits in the dynamic partition; network must win.
    storage
        .put(&config.dynamic_partition, &req.identity(), ok_response("<html>stale</html>"))
        .await;

    match worker.handle_fetch(&req).await {
        FetchOutcome::Handled(response) => {
            assert_eq!(response.body.as_ref(), b"<html>fresh</html>");
        }
        FetchOutcome::PassThrough => panic!("navigation should be handled by a strategy"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn image_requests_are_served_cache_first_from_dynamic() {
    let storage = CacheStorage::new();
    let config = bare_config();
    // No server needed: the cached copy must satisfy the request.
    let worker = worker_for("http://127.0.0.1:3000", config.clone(), storage.clone());

    let req = FetchRequest::get(
        Url::parse("https://images.pexels.com/photos/4342494/pexels-photo-4342494.jpeg").unwrap(),
    );
    storage
        .put(&config.dynamic_partition, &req.identity(), ok_response("jpeg bytes"))
        .await;

    match worker.handle_fetch(&req).await {
        FetchOutcome::Handled(response) => {
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(response.body.as_ref(), b"jpeg bytes");
        }
        FetchOutcome::PassThrough => panic!("image should be handled by a strategy"),
    }
}
