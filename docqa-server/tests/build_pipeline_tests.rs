use std::time::{Duration, Instant};

use axum::Router;
use axum::routing::post;
use docqa_rag::RagError;
use docqa_server::{ServerConfig, build_pipeline};

/// An `/embeddings` endpoint that accepts the request and never answers in time.
async fn spawn_stalled_embeddings() -> String {
    let app = Router::new().route(
        "/v1/embeddings",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "{}"
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn remote_config(embedding_base_url: String) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.embedding.base_url = embedding_base_url;
    config.embedding.api_key = Some("embed-key".to_string());
    config.embedding.timeout = Duration::from_millis(300);
    config.chat.api_key = Some("chat-key".to_string());
    config
}

#[tokio::test]
async fn stalled_embedding_backend_times_out() {
    let base = spawn_stalled_embeddings().await;
    let pipeline = build_pipeline(&remote_config(base)).unwrap();

    let started = Instant::now();
    let ingested = pipeline.ingest(&["Paris is the capital of France."]).await;
    assert!(matches!(ingested, Err(RagError::EmbeddingError { .. })), "{ingested:?}");
    assert_eq!(pipeline.chunk_count().await, 0);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn missing_keys_are_reported() {
    let mut config = ServerConfig::default();
    assert!(build_pipeline(&config).is_err());

    config.embedding.api_key = Some("embed-key".to_string());
    let err = build_pipeline(&config).err().expect("chat key is required");
    assert!(err.to_string().contains("TOGETHER_API_KEY"), "{err}");
}
