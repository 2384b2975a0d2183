//! API integration tests against a spawned server binary.
//!
//! Each test starts the real binary with a simulate-mode printer and a
//! gateway base URL pointing at an unreachable port, then exercises the
//! HTTP surface with a plain client.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config
fn test_config(port: u16, spool_dir: &std::path::Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[gateway]
base_url = "http://127.0.0.1:9/api"
api_key = "super-secret-test-key"
timeout_secs = 1

[printer]
simulate = true
spool_dir = "{}"
"#,
        port,
        spool_dir.display()
    )
}

struct TestServer {
    port: u16,
    client: Client,
    _child: tokio::process::Child,
    _config: NamedTempFile,
    _spool: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let port = get_available_port();
        let spool = TempDir::new().unwrap();

        let mut config = NamedTempFile::new().unwrap();
        config
            .write_all(test_config(port, spool.path()).as_bytes())
            .unwrap();
        config.flush().unwrap();

        let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_printbooth"))
            .env("PRINTBOOTH_CONFIG", config.path())
            .env("RUST_LOG", "error") // Quiet logs during tests
            .kill_on_drop(true)
            .spawn()
            .expect("Failed to spawn server");

        let client = Client::new();
        let server = Self {
            port,
            client,
            _child: child,
            _config: config,
            _spool: spool,
        };

        for _ in 0..100 {
            if server.get("/health").send().await.is_ok() {
                return server;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("server did not become ready");
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/api/v1{}", self.port, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::start().await;

    let response = server.get("/health").send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("ok"));
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn config_endpoint_redacts_api_key() {
    let server = TestServer::start().await;

    let response = server.get("/config").send().await.unwrap();
    assert_eq!(response.status(), 200);

    let text = response.text().await.unwrap();
    assert!(!text.contains("super-secret-test-key"));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["config"]["gateway"]["api_key_configured"], json!(true));
    assert_eq!(body["config"]["printer"]["simulate"], json!(true));
}

#[tokio::test]
async fn queue_starts_empty_and_clear_is_a_noop() {
    let server = TestServer::start().await;

    let body: Value = server
        .get("/queue/status")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["orchestrator"]["queue_len"], json!(0));
    assert_eq!(body["orchestrator"]["polling"], json!(false));
    assert_eq!(body["printer"]["printing"], json!(false));

    let body: Value = server
        .post("/queue/clear")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["cleared"], json!(0));
}

#[tokio::test]
async fn polling_start_validates_and_round_trips() {
    let server = TestServer::start().await;

    // Missing fields are rejected by body deserialization.
    let response = server
        .post("/polling/start")
        .json(&json!({ "interval_ms": 1000 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Empty event id is rejected by the orchestrator.
    let response = server
        .post("/polling/start")
        .json(&json!({ "event_id": "  ", "interval_ms": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));

    // A valid start arms the loop; stop disarms it.
    let response = server
        .post("/polling/start")
        .json(&json!({ "event_id": "e1", "interval_ms": 60000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = server
        .get("/queue/status")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["orchestrator"]["polling"], json!(true));
    assert_eq!(body["orchestrator"]["event_id"], json!("e1"));

    let response = server.post("/polling/stop").send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = server
        .get("/queue/status")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["orchestrator"]["polling"], json!(false));
}

#[tokio::test]
async fn print_event_surfaces_gateway_failure() {
    let server = TestServer::start().await;

    // The configured gateway is unreachable, so discovery fails upstream.
    let response = server.post("/print/event/e1").send().await.unwrap();
    assert_eq!(response.status(), 502);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn self_test_succeeds_in_simulate_mode() {
    let server = TestServer::start().await;

    let response = server.post("/printers/self-test").send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
}
