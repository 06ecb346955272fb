use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use waterwise::config::app::AppConfig;
use waterwise::modules::chat::model::{
    seed_history, ConversationTurn, GenerationConfig, SafetySetting, GENERATION_CONFIG,
    MODEL_NAME, SAFETY_SETTINGS,
};
use waterwise::services::llm::{GenerativeClient, LlmError};
use waterwise::{router, AppState};

#[derive(Debug, Clone)]
struct RecordedCall {
    model: String,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
    history: Vec<ConversationTurn>,
    user_text: String,
}

/// Stand-in for Gemini that records every call and replies with a fixed outcome.
struct StubClient {
    calls: Mutex<Vec<RecordedCall>>,
    reply: Result<String, String>,
}

impl StubClient {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Ok(text.to_string()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Err(message.to_string()),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeClient for StubClient {
    async fn generate(
        &self,
        model: &str,
        generation_config: &GenerationConfig,
        safety_settings: &[SafetySetting],
        history: &[ConversationTurn],
        user_text: &str,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            generation_config: *generation_config,
            safety_settings: safety_settings.to_vec(),
            history: history.to_vec(),
            user_text: user_text.to_string(),
        });

        self.reply.clone().map_err(LlmError::ApiError)
    }
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes this thread's events into a buffer until the guard drops.
fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();

    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

fn setup_test_server(client: Arc<StubClient>) -> TestServer {
    let config = AppConfig {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        ..AppConfig::default()
    };

    let state = AppState {
        config: Arc::new(config),
        llm: client,
    };

    TestServer::new(router(state)).unwrap()
}

#[tokio::test]
async fn test_chat_empty_object_fails() {
    let client = StubClient::replying("unused");
    let server = setup_test_server(client.clone());

    let response = server.post("/chat").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "error": "Invalid request body" })
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_chat_empty_input_fails() {
    let client = StubClient::replying("unused");
    let server = setup_test_server(client.clone());

    let response = server
        .post("/chat")
        .json(&json!({ "userInput": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "error": "Invalid request body" })
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_chat_non_string_input_fails() {
    let client = StubClient::replying("unused");
    let server = setup_test_server(client.clone());

    for body in [json!({ "userInput": null }), json!({ "userInput": 42 }), json!([])] {
        let response = server.post("/chat").json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<serde_json::Value>(),
            json!({ "error": "Invalid request body" })
        );
    }

    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_chat_non_json_body_fails() {
    let client = StubClient::replying("unused");
    let server = setup_test_server(client.clone());

    let response = server.post("/chat").text("How can I save water?").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "error": "Invalid request body" })
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_chat_relays_generated_text() {
    let reply = "  Fix leaky taps first 💧\nThen shorten showers.  ";
    let client = StubClient::replying(reply);
    let server = setup_test_server(client.clone());

    let response = server
        .post("/chat")
        .json(&json!({ "userInput": "How can I save water at home?" }))
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "response": reply })
    );

    let calls = client.calls();
    assert_eq!(calls.len(), 1);

    let call = &calls[0];
    assert_eq!(call.model, MODEL_NAME);
    assert_eq!(call.generation_config, GENERATION_CONFIG);
    assert_eq!(call.safety_settings, SAFETY_SETTINGS.to_vec());
    assert_eq!(call.history, seed_history());
    assert_eq!(call.user_text, "How can I save water at home?");
}

#[tokio::test]
async fn test_chat_ignores_unknown_fields() {
    let client = StubClient::replying("ok");
    let server = setup_test_server(client.clone());

    let response = server
        .post("/chat")
        .json(&json!({ "userInput": "Hi", "sessionId": "abc" }))
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_chat_upstream_failure_is_generic() {
    let (logs, _guard) = capture_logs();
    let client = StubClient::failing("quota exceeded for key AIza-secret");
    let server = setup_test_server(client.clone());

    let response = server
        .post("/chat")
        .json(&json!({ "userInput": "How can I save water at home?" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "error": "Internal Server Error" })
    );
    assert!(!response.text().contains("AIza-secret"));
    assert_eq!(client.calls().len(), 1);

    let logs = logs.contents();
    assert!(logs.contains("Incoming /chat request"));
    assert!(logs.contains("How can I save water at home?"));
    assert!(logs.contains("ERROR"));
    assert!(logs.contains("quota exceeded for key AIza-secret"));
}

#[tokio::test]
async fn test_chat_logs_rejected_body_reason() {
    let (logs, _guard) = capture_logs();
    let client = StubClient::replying("unused");
    let server = setup_test_server(client.clone());

    server
        .post("/chat")
        .text("How can I save water?")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let logs = logs.contents();
    assert!(logs.contains("Incoming /chat request with unreadable body"));
    assert!(logs.contains("application/json"));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_chat_failure_does_not_affect_next_request() {
    let failing = StubClient::failing("network down");
    let server = setup_test_server(failing.clone());

    server
        .post("/chat")
        .json(&json!({ "userInput": "first" }))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    server
        .post("/chat")
        .json(&json!({ "userInput": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(failing.calls().len(), 1);
}

#[tokio::test]
async fn test_seed_history_identical_across_requests() {
    let client = StubClient::replying("ok");
    let server = setup_test_server(client.clone());

    for input in ["Tell me about rain barrels", "And greywater?", "Thanks"] {
        server
            .post("/chat")
            .json(&json!({ "userInput": input }))
            .await
            .assert_status(StatusCode::OK);
    }

    let calls = client.calls();
    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert_eq!(call.history, seed_history());
    }
    assert_eq!(calls[1].user_text, "And greywater?");
}

#[tokio::test]
async fn test_index_page_served() {
    let server = setup_test_server(StubClient::replying("ok"));

    let response = server.get("/").await;

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("WaterWise"));
}

#[tokio::test]
async fn test_loader_gif_served() {
    let server = setup_test_server(StubClient::replying("ok"));

    let response = server.get("/loader.gif").await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/gif");
    assert!(response.as_bytes().starts_with(b"GIF89a"));
}

#[tokio::test]
async fn test_missing_static_dir_is_not_found() {
    let state = AppState {
        config: Arc::new(AppConfig {
            static_dir: PathBuf::from("does-not-exist"),
            ..AppConfig::default()
        }),
        llm: StubClient::replying("ok"),
    };
    let server = TestServer::new(router(state)).unwrap();

    server.get("/").await.assert_status(StatusCode::NOT_FOUND);
}
