// Test utilities and integration tests

#[cfg(test)]
pub mod test_utils {
    use std::sync::{ atomic::{ AtomicU64, Ordering }, Arc };

    use axum::{ body::Body, http::{ Request, StatusCode }, Router };
    use futures::{ future::{ BoxFuture, FutureExt }, stream::{ self, StreamExt } };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::{
        config::Config,
        create_app,
        models::Report,
        repositories::{ InMemoryReportStore, ReportQuery, ReportStore, ReportStream, StoreError },
        utils::ReportGenerator,
        AppState,
    };

    /// In-memory store that reports every completed save on a channel.
    pub struct RecordingStore {
        inner: InMemoryReportStore,
        saved: mpsc::UnboundedSender<Report>,
    }

    impl RecordingStore {
        pub fn new(inner: InMemoryReportStore) -> (Self, mpsc::UnboundedReceiver<Report>) {
            let (saved, receiver) = mpsc::unbounded_channel();
            (Self { inner, saved }, receiver)
        }
    }

    impl ReportStore for RecordingStore {
        fn save(&self, report: Report) -> BoxFuture<'static, Result<Report, StoreError>> {
            let save = self.inner.save(report);
            let saved = self.saved.clone();

            (async move {
                save.await.map(|stored| {
                    let _ = saved.send(stored.clone());
                    stored
                })
            }).boxed()
        }

        fn find(&self, query: ReportQuery) -> ReportStream {
            self.inner.find(query)
        }

        fn backend(&self) -> &'static str {
            "recording"
        }
    }

    /// Store whose every operation fails.
    pub struct FailingStore;

    impl ReportStore for FailingStore {
        fn save(&self, _report: Report) -> BoxFuture<'static, Result<Report, StoreError>> {
            (async { Err(StoreError::Unavailable("save refused".to_string())) }).boxed()
        }

        fn find(&self, _query: ReportQuery) -> ReportStream {
            stream::once(async { Err(StoreError::Unavailable("find refused".to_string())) }).boxed()
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    /// Deterministic generator: names reports `fixed-0`, `fixed-1`, ...
    #[derive(Default)]
    pub struct SequenceGenerator {
        next: AtomicU64,
    }

    impl ReportGenerator for SequenceGenerator {
        fn generate(&self, group: &str) -> Report {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            Report::new(group).with_name(format!("fixed-{}", n)).with_field("position", n)
        }
    }

    pub fn test_app(store: Arc<dyn ReportStore>) -> Router {
        let state = AppState::with_parts(
            Config::for_testing(),
            store,
            Arc::new(SequenceGenerator::default())
        );
        create_app(Arc::new(state))
    }

    /// Saves `count` enabled reports named `report-<n>`, alternating groups `even`/`odd`,
    /// plus one disabled report after every fifth.
    pub async fn seed_reports(store: &InMemoryReportStore, count: usize) {
        for n in 0..count {
            let group = if n % 2 == 0 { "even" } else { "odd" };
            store.save(Report::new(group).with_name(format!("report-{}", n))).await.unwrap();

            if n % 5 == 4 {
                let hidden = Report::new(group).with_name(format!("hidden-{}", n)).disabled();
                store.save(hidden).await.unwrap();
            }
        }
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn names(body: &Value) -> Vec<String> {
        body.as_array()
            .expect("expected a JSON array")
            .iter()
            .map(|report| report["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

#[cfg(test)]
mod integration_tests {
    use std::{ sync::Arc, time::Duration };

    use axum::http::StatusCode;
    use serde_json::json;
    use tokio::time::{ sleep, timeout };

    use super::test_utils::*;
    use crate::{
        dto::ReportCreation,
        models::Report,
        repositories::InMemoryReportStore,
        services::{ ReportService, DISPATCH_BATCH },
        utils::RandomReportGenerator,
    };

    #[tokio::test]
    async fn test_list_without_parameters_uses_default_page() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 25).await;

        let (status, body) = get(test_app(Arc::new(store)), "/reports").await;

        assert_eq!(status, StatusCode::OK);
        let names = names(&body);
        assert_eq!(names.len(), 20);
        assert_eq!(names.first().map(String::as_str), Some("report-0"));
        assert!(names.iter().all(|name| name.starts_with("report-")));
    }

    #[tokio::test]
    async fn test_list_never_returns_disabled_reports() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 25).await;

        let (_, body) = get(test_app(Arc::new(store)), "/reports?size=100").await;

        let reports = body.as_array().unwrap();
        assert_eq!(reports.len(), 25);
        assert!(reports.iter().all(|report| report["enabled"] == json!(true)));
    }

    #[tokio::test]
    async fn test_oversized_page_falls_back_to_default_size() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 30).await;

        let (status, body) = get(test_app(Arc::new(store)), "/reports?size=150").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body).len(), 20);
    }

    #[tokio::test]
    async fn test_invalid_sizes_fall_back_to_default_size() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 30).await;

        for size in ["-1", "0", "-100", "101"] {
            let uri = format!("/reports?size={}", size);
            let (status, body) = get(test_app(Arc::new(store.clone())), &uri).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(names(&body).len(), 20, "size={}", size);
        }
    }

    #[tokio::test]
    async fn test_page_and_size_select_a_window() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 25).await;

        let (_, body) = get(test_app(Arc::new(store)), "/reports?page=1&size=10").await;

        let expected: Vec<String> = (10..20).map(|n| format!("report-{}", n)).collect();
        assert_eq!(names(&body), expected);
    }

    #[tokio::test]
    async fn test_negative_page_uses_default_page() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 5).await;

        let (_, body) = get(test_app(Arc::new(store)), "/reports?page=-3&size=2").await;

        assert_eq!(names(&body), vec!["report-0", "report-1"]);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 25).await;

        let (status, body) = get(test_app(Arc::new(store)), "/reports?page=5").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_group_filter() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 10).await;

        let (_, body) = get(test_app(Arc::new(store)), "/reports?group=odd").await;

        let reports = body.as_array().unwrap();
        assert_eq!(reports.len(), 5);
        assert!(reports.iter().all(|report| report["group"] == json!("odd")));
    }

    #[tokio::test]
    async fn test_blank_group_applies_no_filter() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 10).await;

        let (_, body) = get(test_app(Arc::new(store)), "/reports?group=%20%20").await;

        assert_eq!(names(&body).len(), 10);
    }

    #[tokio::test]
    async fn test_listing_is_repeatable() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 12).await;
        let app = test_app(Arc::new(store));

        let (_, first) = get(app.clone(), "/reports?page=1&size=5").await;
        let (_, second) = get(app, "/reports?page=1&size=5").await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_parameters_use_defaults() {
        let store = InMemoryReportStore::new();
        seed_reports(&store, 25).await;

        let (status, body) = get(test_app(Arc::new(store)), "/reports?group=&page=&size=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body).len(), 20);
    }

    #[tokio::test]
    async fn test_malformed_page_is_rejected() {
        let (status, body) = get(
            test_app(Arc::new(InMemoryReportStore::new())),
            "/reports?size=abc"
        ).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], json!("fail"));
    }

    #[tokio::test]
    async fn test_failing_store_read_is_a_server_error() {
        let (status, body) = get(test_app(Arc::new(FailingStore)), "/reports").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], json!("fail"));
    }

    #[tokio::test]
    async fn test_create_echoes_request_and_dispatches_saves() {
        let (store, mut saved) = RecordingStore::new(InMemoryReportStore::new());
        let request = json!({ "amount": 3, "group": "g" });

        let (status, body) = post_json(test_app(Arc::new(store)), "/reports", &request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, request);

        for _ in 0..3 {
            let report = timeout(Duration::from_secs(2), saved.recv())
                .await
                .expect("save was not dispatched")
                .expect("store dropped");
            assert_eq!(report.group.as_deref(), Some("g"));
            assert!(report.enabled);
            assert!(report.id.is_some());
        }

        sleep(Duration::from_millis(50)).await;
        assert!(saved.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_zero_dispatches_nothing() {
        let inner = InMemoryReportStore::new();
        let (store, mut saved) = RecordingStore::new(inner.clone());
        let request = json!({ "amount": 0, "group": "g" });

        let (status, body) = post_json(test_app(Arc::new(store)), "/reports", &request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, request);

        sleep(Duration::from_millis(50)).await;
        assert!(saved.try_recv().is_err());
        assert!(inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_created_reports_become_listable() {
        let store = InMemoryReportStore::new();
        let app = test_app(Arc::new(store.clone()));

        post_json(app.clone(), "/reports", &json!({ "amount": 4, "group": "fresh" })).await;

        timeout(Duration::from_secs(2), async {
            while store.len().await < 4 {
                sleep(Duration::from_millis(5)).await;
            }
        }).await.expect("saves did not complete");

        let (_, body) = get(app, "/reports?group=fresh").await;
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_create_ignores_save_failures() {
        let request = json!({ "amount": 2, "group": "g" });

        let (status, body) = post_json(test_app(Arc::new(FailingStore)), "/reports", &request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, request);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_amount() {
        let request = json!({ "amount": -1, "group": "g" });

        let (status, body) = post_json(
            test_app(Arc::new(InMemoryReportStore::new())),
            "/reports",
            &request
        ).await;

        assert!(status.is_client_error());
        assert_eq!(body["status"], json!("fail"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = get(test_app(Arc::new(InMemoryReportStore::new())), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], json!("fail"));
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let (status, body) = get(test_app(Arc::new(InMemoryReportStore::new())), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["store"], json!("memory"));
    }

    #[tokio::test]
    async fn test_service_create_returns_stored_report() {
        let store = InMemoryReportStore::new();
        let service = ReportService::new(
            Arc::new(store.clone()),
            Arc::new(RandomReportGenerator::new())
        );

        let stored = service.create(Report::new("group-1")).await.unwrap();

        assert!(stored.id.is_some());
        assert_eq!(store.all().await, vec![stored]);
    }

    #[tokio::test]
    async fn test_long_group_is_stored_and_listed() {
        let group = "x".repeat(300);
        let store = InMemoryReportStore::new();
        let app = test_app(Arc::new(store.clone()));

        let request = json!({ "amount": 3, "group": group });
        let (status, body) = post_json(app.clone(), "/reports", &request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, request);

        timeout(Duration::from_secs(2), async {
            while store.len().await < 3 {
                sleep(Duration::from_millis(5)).await;
            }
        }).await.expect("saves did not complete");

        let (_, body) = get(app, &format!("/reports?group={}", group)).await;
        let reports = body.as_array().unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|report| report["group"] == json!(group)));
    }

    #[tokio::test]
    async fn test_large_dispatch_lets_saves_run_before_returning() {
        let (store, mut saved) = RecordingStore::new(InMemoryReportStore::new());
        let service = ReportService::new(Arc::new(store), Arc::new(SequenceGenerator::default()));
        let creation = ReportCreation::new(DISPATCH_BATCH * 2, "bulk");

        let echoed = service.create_reports(creation.clone()).await;
        assert_eq!(echoed, creation);

        // single-threaded test runtime: only a yield inside the loop lets saves run this early
        assert!(saved.try_recv().is_ok());
    }
}
