use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use docqa_model::MockLlm;
use docqa_rag::{EmbeddingProvider, RagError, RagPipeline};
use docqa_server::{AppState, app_router};
use serde_json::{Value, json};

const VOCABULARY: &[&str] = &["paris", "france", "eiffel", "tower", "known", "capital", "rust"];

/// Counts vocabulary words, so overlapping keywords mean higher similarity.
struct KeywordEmbedder {
    fail: AtomicBool,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self { fail: AtomicBool::new(false) }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> docqa_rag::Result<Vec<f32>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RagError::EmbeddingError {
                provider: "keyword".into(),
                message: "embedding service unavailable".into(),
            });
        }
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).collect();
        Ok(VOCABULARY.iter().map(|v| words.iter().filter(|w| *w == v).count() as f32).collect())
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len()
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

struct TestServer {
    base: String,
    embedder: Arc<KeywordEmbedder>,
    llm: Arc<MockLlm>,
    handle: tokio::task::JoinHandle<()>,
}

async fn spawn_server(llm: MockLlm) -> TestServer {
    let embedder = Arc::new(KeywordEmbedder::new());
    let llm = Arc::new(llm);
    let pipeline = RagPipeline::builder()
        .embedding_provider(embedder.clone())
        .generation_provider(llm.clone())
        .build()
        .expect("pipeline");
    let app = app_router(AppState::new(pipeline, 1024 * 1024));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    TestServer { base: format!("http://{}", addr), embedder, llm, handle }
}

async fn upload(client: &reqwest::Client, base: &str, name: &str, bytes: Vec<u8>) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);
    client
        .post(format!("{}/api/upload", base))
        .multipart(form)
        .send()
        .await
        .expect("upload response")
}

async fn chat(client: &reqwest::Client, base: &str, message: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": message }))
        .send()
        .await
        .expect("chat response")
}

#[tokio::test]
async fn health_reports_chunk_count() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/health", server.base))
        .send()
        .await
        .expect("health response")
        .json()
        .await
        .expect("health json");
    assert_eq!(body, json!({"status": "ok", "service": "docqa", "chunks": 0}));

    server.handle.abort();
}

#[tokio::test]
async fn chat_on_empty_knowledge_base_returns_fallback() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let response = chat(&client, &server.base, "What is Paris known for?").await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("chat json");
    assert_eq!(body["response"], "I don't have enough information to answer this question.");
    assert_eq!(server.llm.call_count().await, 0);

    server.handle.abort();
}

#[tokio::test]
async fn empty_chat_message_is_bad_request() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let response = chat(&client, &server.base, "").await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("error json");
    assert_eq!(body["detail"], "No message provided");

    server.handle.abort();
}

#[tokio::test]
async fn whitespace_chat_message_is_answered() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let response = chat(&client, &server.base, "   ").await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("chat json");
    assert_eq!(body["response"], "I don't have enough information to answer this question.");

    server.handle.abort();
}

#[tokio::test]
async fn upload_then_chat_answers_from_document() {
    let server = spawn_server(
        MockLlm::new("mock").with_reply("Paris is known for the Eiffel Tower."),
    )
    .await;
    let client = reqwest::Client::new();

    let response = upload(
        &client,
        &server.base,
        "paris.txt",
        b"Paris is the capital of France.\nIt is known for the Eiffel Tower.\n".to_vec(),
    )
    .await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("upload json");
    assert_eq!(body["message"], "File 'paris.txt' uploaded and added to knowledge base.");
    assert_eq!(body["chunks"], 2);

    let response = chat(&client, &server.base, "What is Paris known for?").await;
    let body: Value = response.json().await.expect("chat json");
    assert_eq!(body["response"], "Paris is known for the Eiffel Tower.");

    let received = server.llm.received().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].len(), 1);
    let prompt = &received[0][0].content;
    assert!(prompt.contains("It is known for the Eiffel Tower."));
    assert!(prompt.contains("Question: What is Paris known for?"));

    server.handle.abort();
}

#[tokio::test]
async fn short_model_reply_is_replaced_with_apology() {
    let server = spawn_server(MockLlm::new("mock").with_reply("Paris.")).await;
    let client = reqwest::Client::new();

    upload(&client, &server.base, "paris.txt", b"Paris is the capital of France.".to_vec()).await;
    let body: Value = chat(&client, &server.base, "What is the capital of France?")
        .await
        .json()
        .await
        .expect("chat json");
    assert_eq!(
        body["response"],
        "I apologize, but I couldn't generate a proper response. Please try rephrasing your question."
    );

    server.handle.abort();
}

#[tokio::test]
async fn model_failure_is_masked_in_chat() {
    let server = spawn_server(MockLlm::new("mock").failing("rate limited")).await;
    let client = reqwest::Client::new();

    upload(&client, &server.base, "paris.txt", b"Paris is the capital of France.".to_vec()).await;
    let response = chat(&client, &server.base, "What is the capital of France?").await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("chat json");
    assert_eq!(
        body["response"],
        "I apologize, but I encountered an error while generating the response."
    );

    server.handle.abort();
}

#[tokio::test]
async fn embedding_failure_is_internal_error() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    upload(&client, &server.base, "paris.txt", b"Paris is the capital of France.".to_vec()).await;
    server.embedder.fail.store(true, Ordering::SeqCst);

    let response = chat(&client, &server.base, "What is the capital of France?").await;
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("error json");
    let detail = body["detail"].as_str().expect("detail string");
    assert!(detail.contains("embedding service unavailable"), "{detail}");

    let response = upload(&client, &server.base, "more.txt", b"Rust is fast.".to_vec()).await;
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let health: Value = client
        .get(format!("{}/health", server.base))
        .send()
        .await
        .expect("health response")
        .json()
        .await
        .expect("health json");
    assert_eq!(health["chunks"], 1, "failed upload must not add chunks");

    server.handle.abort();
}

#[tokio::test]
async fn empty_upload_is_bad_request() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let response = upload(&client, &server.base, "empty.txt", Vec::new()).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("error json");
    assert_eq!(body["detail"], "File is empty");

    server.handle.abort();
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let response = client
        .post(format!("{}/api/upload", server.base))
        .multipart(form)
        .send()
        .await
        .expect("upload response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    server.handle.abort();
}

#[tokio::test]
async fn latin1_upload_is_decoded() {
    let server = spawn_server(MockLlm::new("mock").with_reply("The Paris café is near the tower.")).await;
    let client = reqwest::Client::new();

    // "Paris caf\xe9 near the Eiffel tower" is not valid UTF-8.
    let mut bytes = b"Paris caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b" near the Eiffel tower");
    let response = upload(&client, &server.base, "latin1.txt", bytes).await;
    assert!(response.status().is_success());

    chat(&client, &server.base, "Where is the Paris cafe?").await;
    let received = server.llm.received().await;
    assert!(received[0][0].content.contains("Paris café near the Eiffel tower"));

    server.handle.abort();
}

#[tokio::test]
async fn history_endpoint_forwards_turns_verbatim() {
    let server = spawn_server(MockLlm::new("mock").with_reply("  Hello again!  ")).await;
    let client = reqwest::Client::new();

    let turns = json!([
        {"role": "system", "content": "You are helpful."},
        {"role": "user", "content": "Hi"},
        {"role": "assistant", "content": "Hello!"},
        {"role": "user", "content": "Hi again"}
    ]);
    let response = client
        .post(format!("{}/api/chat/history", server.base))
        .json(&json!({ "messages": turns }))
        .send()
        .await
        .expect("history response");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("history json");
    assert_eq!(body["response"], "Hello again!");

    let received = server.llm.received().await;
    assert_eq!(serde_json::to_value(&received[0]).expect("turns json"), turns);

    server.handle.abort();
}

#[tokio::test]
async fn empty_history_is_bad_request() {
    let server = spawn_server(MockLlm::new("mock")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/chat/history", server.base))
        .json(&json!({ "messages": [] }))
        .send()
        .await
        .expect("history response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(server.llm.call_count().await, 0);

    server.handle.abort();
}

#[tokio::test]
async fn failures_are_logged_with_operation_name() {
    let storage = Arc::new(docqa_telemetry::SharedLogStorage::new());
    let _guard = tracing::subscriber::set_default(docqa_telemetry::capturing_subscriber(storage.clone()));

    let server = spawn_server(MockLlm::new("mock").failing("rate limited")).await;
    let client = reqwest::Client::new();

    upload(&client, &server.base, "paris.txt", b"Paris is the capital of France.".to_vec()).await;
    chat(&client, &server.base, "What is the capital of France?").await;

    let generation = storage.find(tracing::Level::ERROR, "operation", "answer");
    assert_eq!(generation.len(), 1);
    assert!(generation[0].field_str("error").is_some_and(|e| e.contains("rate limited")));

    server.embedder.fail.store(true, Ordering::SeqCst);
    chat(&client, &server.base, "What is the capital of France?").await;

    assert_eq!(storage.find(tracing::Level::ERROR, "operation", "search").len(), 1);
    assert_eq!(storage.find(tracing::Level::ERROR, "operation", "chat").len(), 1);

    server.handle.abort();
}
