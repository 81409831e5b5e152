use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::{get, post},
};
use docqa_model::openai::{ChatConfig, OpenAICompatibleClient};
use docqa_rag::{
    Chunker, EmbeddingProvider, LineChunker, ParagraphChunker, RagPipeline,
    openai::OpenAIEmbeddingProvider,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::{
    config::{ChunkingStrategy, EmbeddingBackend, ServerConfig},
    decode::decode_text,
    error::ApiError,
    protocol::{ChatRequest, ChatResponse, HealthResponse, HistoryRequest, UploadResponse},
};

pub const SERVICE_NAME: &str = "docqa";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: RagPipeline,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: RagPipeline, max_upload_bytes: usize) -> Self {
        Self { pipeline, max_upload_bytes }
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/chat/history", post(chat_with_history))
        .route("/api/upload", post(upload).layer(upload_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Assemble the pipeline from configured providers.
pub fn build_pipeline(config: &ServerConfig) -> anyhow::Result<RagPipeline> {
    let embedding_provider: Arc<dyn EmbeddingProvider> = match config.embedding.backend {
        EmbeddingBackend::Remote => {
            let api_key = config
                .embedding
                .api_key
                .clone()
                .context("DOCQA_EMBEDDING_API_KEY or TOGETHER_API_KEY must be set")?;
            Arc::new(
                OpenAIEmbeddingProvider::new(api_key)?
                    .with_base_url(&config.embedding.base_url)
                    .with_model(&config.embedding.model)
                    .with_dimensions(config.embedding.dimensions)
                    .with_timeout(config.embedding.timeout)?,
            )
        }
        EmbeddingBackend::Local => local_embedding_provider()?,
    };

    let chat_key = config.chat.api_key.clone().context("TOGETHER_API_KEY must be set")?;
    let generation_provider = OpenAICompatibleClient::new(
        ChatConfig::new(chat_key, &config.chat.model).with_base_url(&config.chat.base_url),
    )?;

    let chunker: Arc<dyn Chunker> = match config.chunking {
        ChunkingStrategy::Line => Arc::new(LineChunker),
        ChunkingStrategy::Paragraph => Arc::new(ParagraphChunker),
    };

    info!(
        embedding_backend = ?config.embedding.backend,
        embedding_model = %embedding_provider.name(),
        chat_model = %config.chat.model,
        chunking = ?config.chunking,
        top_k = config.rag.top_k,
        "building pipeline"
    );

    Ok(RagPipeline::builder()
        .config(config.rag.clone())
        .embedding_provider(embedding_provider)
        .generation_provider(Arc::new(generation_provider))
        .chunker(chunker)
        .build()?)
}

#[cfg(feature = "local-embeddings")]
fn local_embedding_provider() -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Ok(Arc::new(docqa_rag::local::FastEmbedProvider::new()?))
}

#[cfg(not(feature = "local-embeddings"))]
fn local_embedding_provider() -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    anyhow::bail!("DOCQA_EMBEDDING_BACKEND=local requires building with the local-embeddings feature")
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&config)?;
    let app = app_router(AppState::new(pipeline, config.max_upload_bytes));
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for docqa server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("docqa listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        chunks: state.pipeline.chunk_count().await,
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.is_empty() {
        return Err(ApiError::BadRequest("No message provided".to_string()));
    }

    let span = info_span!("chat", request_id = %Uuid::new_v4());
    let response = state
        .pipeline
        .answer(&request.message)
        .instrument(span)
        .await
        .inspect_err(|e| error!(operation = "chat", error = %e, "chat request failed"))?;

    Ok(Json(ChatResponse { response }))
}

async fn chat_with_history(
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest("No messages provided".to_string()));
    }

    let span = info_span!("chat_history", request_id = %Uuid::new_v4(), turns = request.messages.len());
    let response = state.pipeline.answer_with_history(&request.messages).instrument(span).await;

    Ok(Json(ChatResponse { response }))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {e}")))?;
        if content.is_empty() {
            return Err(ApiError::BadRequest("File is empty".to_string()));
        }

        let text = decode_text(&content);
        let span = info_span!("upload", %request_id, file = %file_name, bytes = content.len());
        let chunks = state
            .pipeline
            .ingest(&[text])
            .instrument(span)
            .await
            .inspect_err(|e| error!(operation = "upload", error = %e, "upload failed"))?;

        return Ok(Json(UploadResponse {
            message: format!("File '{file_name}' uploaded and added to knowledge base."),
            chunks,
        }));
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}
