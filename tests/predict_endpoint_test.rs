use anyhow::Result;
use predict_shim::adapters::http::{self, AppState, HealthResponse};
use predict_shim::app::serve::build_engine;
use predict_shim::CliConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Positive score -> class 1. Score = 0.1 * age - 0.001 * income.
const MODEL: &str = r#"{
    "kind": "linear",
    "classes": [0, 1],
    "coefficients": [[0.1, -0.001]],
    "intercepts": [0.0]
}"#;

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
    _dir: TempDir,
}

impl TestServer {
    async fn start(model: &str, columns: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        tokio::fs::write(dir.path().join("best_model.json"), model).await?;
        tokio::fs::write(dir.path().join("columns.json"), columns).await?;

        let config = CliConfig {
            artifact_dir: dir.path().to_string_lossy().into_owned(),
            ..CliConfig::default()
        };
        let engine = build_engine(&config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(http::serve(listener, AppState::new(engine), async move {
            let _ = rx.await;
        }));

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle,
            _dir: dir,
        })
    }

    async fn post_raw(&self, body: &str) -> Result<(u16, Value)> {
        let response = self
            .client
            .post(format!("http://{}/predict", self.addr))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    async fn post(&self, body: Value) -> Result<(u16, Value)> {
        self.post_raw(&body.to_string()).await
    }

    async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await??;
        Ok(())
    }
}

async fn age_income_server() -> Result<TestServer> {
    TestServer::start(MODEL, r#"["age", "income"]"#).await
}

#[tokio::test]
async fn test_full_payload_predicts_200() -> Result<()> {
    let server = age_income_server().await?;

    let (status, body) = server.post(json!({"age": 30, "income": 50000})).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"prediction": 0}));

    server.stop().await
}

#[tokio::test]
async fn test_missing_feature_defaults_to_zero() -> Result<()> {
    let server = age_income_server().await?;

    // [30, 0] scores +3.0
    let (status, body) = server.post(json!({"age": 30})).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"prediction": 1}));

    server.stop().await
}

#[tokio::test]
async fn test_empty_object_is_a_prediction_attempt() -> Result<()> {
    let server = age_income_server().await?;

    let (status, body) = server.post(json!({})).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"prediction": 0}));

    server.stop().await
}

#[tokio::test]
async fn test_extra_keys_are_ignored() -> Result<()> {
    let server = age_income_server().await?;

    let (_, plain) = server.post(json!({"age": 30})).await?;
    let (status, extra) = server
        .post(json!({"age": 30, "favourite_colour": "green", "income_2": 1e9}))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(plain, extra);

    server.stop().await
}

#[tokio::test]
async fn test_identical_payloads_give_identical_predictions() -> Result<()> {
    let server = age_income_server().await?;

    let payload = json!({"age": 52, "income": 1200});
    let (_, first) = server.post(payload.clone()).await?;
    let (_, second) = server.post(payload).await?;
    assert_eq!(first, second);

    server.stop().await
}

#[tokio::test]
async fn test_malformed_json_returns_400() -> Result<()> {
    let server = age_income_server().await?;

    let (status, body) = server.post_raw("not json").await?;
    assert_eq!(status, 400);
    let message = body["error"].as_str().unwrap_or_default();
    assert!(!message.is_empty());
    assert!(body.get("prediction").is_none());

    server.stop().await
}

#[tokio::test]
async fn test_non_object_body_returns_400() -> Result<()> {
    let server = age_income_server().await?;

    let (status, body) = server.post(json!([30, 50000])).await?;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().is_some());

    server.stop().await
}

#[tokio::test]
async fn test_non_numeric_value_returns_400() -> Result<()> {
    let server = age_income_server().await?;

    let (status, body) = server.post(json!({"age": "thirty"})).await?;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "could not convert string to float: 'thirty'");

    // numeric strings are accepted
    let (status, _) = server.post(json!({"age": "30"})).await?;
    assert_eq!(status, 200);

    server.stop().await
}

#[tokio::test]
async fn test_missing_content_type_still_parses() -> Result<()> {
    let server = age_income_server().await?;

    let response = server
        .client
        .post(format!("http://{}/predict", server.addr))
        .body(r#"{"age": 30}"#)
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"prediction": 1}));

    server.stop().await
}

#[tokio::test]
async fn test_body_over_two_mebibytes_is_still_predicted() -> Result<()> {
    let server = age_income_server().await?;

    // larger than axum's default body limit; extra keys are ignored as usual
    let padding = "x".repeat(3 * 1024 * 1024);
    let (status, body) = server.post(json!({"age": 30, "pad": padding})).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"prediction": 1}));

    server.stop().await
}

#[tokio::test]
async fn test_schema_model_width_mismatch_returns_400() -> Result<()> {
    let server = TestServer::start(MODEL, r#"["age", "income", "tenure"]"#).await?;

    let (status, body) = server.post(json!({"age": 30})).await?;
    assert_eq!(status, 400);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("expecting 2 features"));

    // the failure does not poison later requests
    let (status, _) = server.post(json!({"age": 1})).await?;
    assert_eq!(status, 400);

    server.stop().await
}

#[tokio::test]
async fn test_error_does_not_affect_next_request() -> Result<()> {
    let server = age_income_server().await?;

    let (status, _) = server.post_raw("{").await?;
    assert_eq!(status, 400);

    let (status, body) = server.post(json!({"age": 30})).await?;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"prediction": 1}));

    server.stop().await
}

#[tokio::test]
async fn test_random_forest_model_serves() -> Result<()> {
    let forest = r#"{
        "kind": "random_forest",
        "classes": [0, 1, 2],
        "n_features": 2,
        "trees": [
            {"nodes": [
                {"feature": 0, "threshold": 18.0, "left": 1, "right": 2},
                {"value": [10.0, 0.0, 0.0]},
                {"value": [0.0, 6.0, 4.0]}
            ]},
            {"nodes": [
                {"feature": 1, "threshold": 100000.0, "left": 1, "right": 2},
                {"value": [0.0, 7.0, 3.0]},
                {"value": [0.0, 1.0, 9.0]}
            ]}
        ]
    }"#;
    let server = TestServer::start(forest, r#"["age", "income"]"#).await?;

    let (status, body) = server.post(json!({"age": 10})).await?;
    assert_eq!(status, 200);
    // tree 0 -> [1, 0, 0], tree 1 -> [0, .7, .3]
    assert_eq!(body, json!({"prediction": 0}));

    let (_, body) = server.post(json!({"age": 40, "income": 250000})).await?;
    // tree 0 -> [0, .6, .4], tree 1 -> [0, .1, .9]
    assert_eq!(body, json!({"prediction": 2}));

    server.stop().await
}

#[tokio::test]
async fn test_health_reports_loaded_model() -> Result<()> {
    let server = age_income_server().await?;

    let health: HealthResponse = server
        .client
        .get(format!("http://{}/health", server.addr))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);
    assert_eq!(health.model_kind, "linear");
    assert_eq!(health.n_features, 2);

    server.stop().await
}

#[tokio::test]
async fn test_get_on_predict_is_not_allowed() -> Result<()> {
    let server = age_income_server().await?;

    let response = server
        .client
        .get(format!("http://{}/predict", server.addr))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 405);

    server.stop().await
}
