//! End-to-end webhook pipeline scenarios against stubbed platform endpoints.

use std::io::Write;
use std::path::Path;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use investor_adapter::config::{Config, OAuthConfig, PartnerApiConfig, RetryPolicy, WebhookConfig};
use investor_adapter::services::{PipelineOutcome, WebhookDispatcher};
use investor_adapter::startup::initialize_app;

const SECRET: &str = "unit-test-secret";

fn test_config(server_uri: &str, package_root: &Path) -> Config {
    Config {
        environment: "test".to_string(),
        port: 0,
        webhook: WebhookConfig {
            secret: SECRET.to_string(),
        },
        oauth: OAuthConfig {
            url: server_uri.to_string(),
            token_endpoint: "/oauth2/v1/token".to_string(),
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            scope: "pc pcapi".to_string(),
        },
        partner_api: PartnerApiConfig {
            host: server_uri.to_string(),
            request_uri: "/partner/v1/transactions/{{transactionId}}/request".to_string(),
            response_uri: "/partner/v1/transactions/{{transactionId}}/response".to_string(),
        },
        retry: RetryPolicy {
            max_attempts: 2,
            interval_millis: 5,
        },
        package_root: package_root.to_path_buf(),
    }
}

fn dispatcher_for(config: &Config) -> WebhookDispatcher {
    initialize_app(config).unwrap().dispatcher
}

fn signed(body: &str) -> (Vec<u8>, String) {
    let raw = body.as_bytes().to_vec();
    let signature = WebhookDispatcher::notification_token(SECRET.as_bytes(), &raw);
    (raw, signature)
}

fn loan_package_zip() -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut buffer);
    writer
        .start_file("LOAN1_pkg.pdf", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"%PDF-1.4 test package").unwrap();
    writer.finish().unwrap();
    buffer.into_inner()
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/v1/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-123",
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

async fn mount_get_request(server: &MockServer, attachment_uri: &str) {
    Mock::given(method("GET"))
        .and(path("/partner/v1/transactions/TX-1/request"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product": {
                "attachments": [{"uri": attachment_uri}],
                "options": {
                    "investorOptions": [{"OrderId": "ORD-1"}]
                }
            },
            "credentials": {"user": "investor", "company": "acme"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_request_delivers_package_and_submits_status() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    mount_token_endpoint(&server).await;
    mount_get_request(&server, &format!("{}/files/pkg.zip", server.uri())).await;

    Mock::given(method("GET"))
        .and(path("/files/pkg.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/zip")
                .set_body_bytes(loan_package_zip()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/partner/v1/transactions/TX-1/response"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(body_string_contains("Delivered"))
        .and(body_string_contains("ORD-1"))
        .and(body_string_contains("The loan package has been delivered"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) =
        signed(r#"{"eventType":"CreateRequest","meta":{"resourceId":"TX-1"}}"#);

    let handle = dispatcher.accept(&body, &signature).expect("accepted");
    let outcome = handle.await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Delivered { submitted: true });

    // The repackaged archive landed under the package root.
    let archives: Vec<_> = std::fs::read_dir(package_root.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("LOAN1_"));
    assert!(archives[0].ends_with(".zip"));
}

#[tokio::test]
async fn non_zip_content_still_submits_not_delivered_status() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    mount_token_endpoint(&server).await;
    mount_get_request(&server, &format!("{}/files/pkg.zip", server.uri())).await;

    Mock::given(method("GET"))
        .and(path("/files/pkg.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("<html>not a package</html>"),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/partner/v1/transactions/TX-1/response"))
        .and(body_string_contains("Not Delivered"))
        .and(body_string_contains("Unable to download loan package"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) =
        signed(r#"{"eventType":"CreateRequest","meta":{"resourceId":"TX-1"}}"#);

    let outcome = dispatcher.accept(&body, &signature).unwrap().await.unwrap();
    assert_eq!(outcome, PipelineOutcome::NotDelivered { submitted: true });
}

#[tokio::test]
async fn missing_request_data_ends_run_without_submission() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/partner/v1/transactions/TX-1/request"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/partner/v1/transactions/TX-1/response"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) =
        signed(r#"{"eventType":"CreateRequest","meta":{"resourceId":"TX-1"}}"#);

    let outcome = dispatcher.accept(&body, &signature).unwrap().await.unwrap();
    assert_eq!(outcome, PipelineOutcome::NoRequestData);
}

#[tokio::test]
async fn failed_token_exchange_aborts_before_partner_calls() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/v1/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/partner/v1/transactions/TX-1/request"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) =
        signed(r#"{"eventType":"CreateRequest","meta":{"resourceId":"TX-1"}}"#);

    let outcome = dispatcher.accept(&body, &signature).unwrap().await.unwrap();
    assert_eq!(outcome, PipelineOutcome::NoRequestData);
}

#[tokio::test]
async fn other_event_types_are_accepted_but_ignored() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) =
        signed(r#"{"eventType":"UpdateRequest","meta":{"resourceId":"TX-1"}}"#);

    let outcome = dispatcher.accept(&body, &signature).unwrap().await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Ignored);
}

#[tokio::test]
async fn empty_transaction_id_aborts_without_api_calls() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) = signed(r#"{"eventType":"CreateRequest","meta":{"resourceId":""}}"#);

    let outcome = dispatcher.accept(&body, &signature).unwrap().await.unwrap();
    assert_eq!(outcome, PipelineOutcome::MissingTransactionId);
}

#[tokio::test]
async fn invalid_signature_schedules_nothing() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let body = br#"{"eventType":"CreateRequest","meta":{"resourceId":"TX-1"}}"#;

    assert!(dispatcher.accept(body, "bogus-signature").is_none());
}

#[tokio::test]
async fn malformed_payload_schedules_nothing() {
    let server = MockServer::start().await;
    let package_root = tempfile::tempdir().unwrap();

    let dispatcher = dispatcher_for(&test_config(&server.uri(), package_root.path()));
    let (body, signature) = signed("this is not json");

    assert!(dispatcher.accept(&body, &signature).is_none());
}

mod http_contract {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use investor_adapter::router::build_router;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn webhook_endpoint_always_returns_200() {
        let server = MockServer::start().await;
        let package_root = tempfile::tempdir().unwrap();
        let config = test_config(&server.uri(), package_root.path());
        let app = build_router(initialize_app(&config).unwrap());

        // Invalid signature still gets a 200: fire-and-forget contract.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhook")
                    .header("Elli-Signature", "wrong")
                    .header("Elli-Environment", "sandbox")
                    .body(Body::from(r#"{"eventType":"CreateRequest"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Empty payload is a tolerated no-op.
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_endpoint_reports_healthy() {
        let server = MockServer::start().await;
        let package_root = tempfile::tempdir().unwrap();
        let config = test_config(&server.uri(), package_root.path());
        let app = build_router(initialize_app(&config).unwrap());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
