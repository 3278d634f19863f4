//! HTTP chat API and static front end.
//!
//! - `POST /api/chat` answers a question with cited episodes
//! - `GET /api/status` reports the indexed chunk count and the guest roster
//! - `GET /` and `/static/*` serve the browser client

use crate::config::{CorpusSettings, Settings};
use crate::rag::{QueryPipeline, SourceAttribution};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, instrument};

/// Shared application state.
pub struct AppState {
    pipeline: Arc<QueryPipeline>,
    corpus: CorpusSettings,
    default_image: String,
}

impl AppState {
    pub fn new(pipeline: Arc<QueryPipeline>, corpus: CorpusSettings, default_image: &str) -> Self {
        Self {
            pipeline,
            corpus,
            default_image: default_image.to_string(),
        }
    }

    pub fn from_settings(pipeline: Arc<QueryPipeline>, settings: &Settings) -> Self {
        Self::new(
            pipeline,
            settings.corpus.clone(),
            &settings.server.default_image,
        )
    }

    /// Portrait for an episode's guest, or the default image.
    fn image_for(&self, episode: u32) -> &str {
        self.corpus
            .episodes
            .iter()
            .find(|e| e.episode == episode)
            .map(|e| e.image.as_str())
            .unwrap_or(&self.default_image)
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/status", get(status))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<SourceInfo>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SourceInfo {
    pub episode: u32,
    pub guest: String,
    pub image: String,
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub documents: usize,
    pub host: GuestInfo,
    pub guests: Vec<GuestInfo>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GuestInfo {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// === Handlers ===

#[instrument(skip_all)]
async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    if req.query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Empty query");
    }

    let top_k = state.pipeline.top_k();
    match state.pipeline.respond(&req.query, top_k).await {
        Ok(answer) => {
            let sources = answer
                .sources
                .into_iter()
                .map(|s: SourceAttribution| SourceInfo {
                    image: state.image_for(s.episode).to_string(),
                    episode: s.episode,
                    guest: s.guest,
                    score: s.score,
                })
                .collect();

            Json(ChatResponse {
                response: answer.response,
                sources,
            })
            .into_response()
        }
        Err(e) => {
            error!("Chat request failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn status(State(state): State<Arc<AppState>>) -> Response {
    let documents = match state.pipeline.document_count().await {
        Ok(n) => n,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut episodes: Vec<_> = state.corpus.episodes.iter().collect();
    episodes.sort_by_key(|e| e.episode);

    Json(StatusResponse {
        status: "ok".to_string(),
        documents,
        host: GuestInfo {
            name: state.corpus.host.name.clone(),
            image: state.corpus.host.image.clone(),
            episode: None,
            youtube_url: None,
        },
        guests: episodes
            .into_iter()
            .map(|e| GuestInfo {
                name: e.guest.clone(),
                image: e.image.clone(),
                episode: Some(e.episode),
                youtube_url: e.youtube_url.clone(),
            })
            .collect(),
    })
    .into_response()
}

/// Bind and serve until the process is stopped.
pub async fn run(state: Arc<AppState>, static_dir: &Path, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(state, static_dir);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EpisodeSettings;
    use crate::testing::{seeded_store, ByteEmbedder, StubGenerator};
    use crate::vector_store::MemoryVectorStore;

    async fn state_with(generator: Arc<StubGenerator>, seeded: bool) -> (Arc<AppState>, Arc<ByteEmbedder>) {
        let embedder = Arc::new(ByteEmbedder::new());
        let store = if seeded {
            seeded_store(embedder.as_ref()).await
        } else {
            Arc::new(MemoryVectorStore::new())
        };
        let pipeline = Arc::new(QueryPipeline::new(embedder.clone(), store, generator));
        let state = AppState::new(pipeline, CorpusSettings::default(), "default.jpg");
        (Arc::new(state), embedder)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let generator = Arc::new(StubGenerator::new("cevap"));
        let (state, embedder) = state_with(generator.clone(), true).await;
        let embeds_before = embedder.calls();

        let response = chat(
            State(state),
            Json(ChatRequest {
                query: "  ".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body["error"], "Empty query");
        assert_eq!(embedder.calls(), embeds_before);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_returns_sources_with_images() {
        let (state, _) = state_with(Arc::new(StubGenerator::new("Cevap metni")), true).await;

        let response = chat(
            State(state),
            Json(ChatRequest {
                query: "Junior adaylar nasıl iş bulur?".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatResponse = body_json(response).await;
        assert_eq!(body.response, "Cevap metni");
        assert!(!body.sources.is_empty());
        for source in &body.sources {
            assert!((1..=8).contains(&source.episode));
            assert_ne!(source.image, "default.jpg");
        }
    }

    #[tokio::test]
    async fn test_generation_failure_is_500() {
        let (state, _) = state_with(Arc::new(StubGenerator::failing()), true).await;

        let response = chat(
            State(state),
            Json(ChatRequest {
                query: "soru".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("stub failure"));
    }

    #[tokio::test]
    async fn test_unknown_episode_gets_default_image() {
        let (state, _) = state_with(Arc::new(StubGenerator::new("x")), false).await;
        assert_eq!(state.image_for(42), "default.jpg");
        assert_eq!(state.image_for(3), "alara_dirik.jpg");

        let mut corpus = CorpusSettings::default();
        corpus.episodes.push(EpisodeSettings {
            episode: 9,
            guest: "Yeni Konuk".to_string(),
            file: "ep9.txt".to_string(),
            image: "yeni.jpg".to_string(),
            youtube_url: None,
        });
        let state = AppState::new(state.pipeline.clone(), corpus, "fallback.png");
        assert_eq!(state.image_for(9), "yeni.jpg");
        assert_eq!(state.image_for(10), "fallback.png");
    }

    #[tokio::test]
    async fn test_status_on_empty_corpus() {
        let (state, _) = state_with(Arc::new(StubGenerator::new("x")), false).await;

        let response = status(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: StatusResponse = body_json(response).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.documents, 0);
        assert_eq!(body.guests.len(), 8);
        assert_eq!(body.guests[0].name, "Kaan Bıçakçı");
        assert_eq!(body.guests[0].image, "kaan_bicakci.jpg");
        assert_eq!(body.host.name, "Enes Fehmi Manan");
    }

    #[tokio::test]
    async fn test_status_counts_documents() {
        let (state, _) = state_with(Arc::new(StubGenerator::new("x")), true).await;
        let body: StatusResponse = body_json(status(State(state)).await).await;
        assert_eq!(body.documents, 16);
    }
}
