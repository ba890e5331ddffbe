//! HTTP server: article routes plus the pre-built static site

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::ContentType;
use crate::handler::ArticleHandler;
use crate::Site;

/// Server state
#[derive(Clone)]
pub struct AppState {
    handler: Arc<ArticleHandler>,
}

impl AppState {
    pub fn new(handler: ArticleHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Build the application router
///
/// Paths other than the article routes (including the trailing-slash static
/// pages that redirects point at) are served from `public_dir`.
pub fn router<P: AsRef<FsPath>>(state: AppState, public_dir: P) -> Router {
    let static_files = ServeDir::new(public_dir.as_ref()).append_index_html_on_directories(true);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/knowledge/:slug", get(knowledge_article))
        .route("/news/:slug", get(news_article))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let handler = site.article_handler()?;
    let app = router(AppState::new(handler), &site.public_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Content API: {}", site.config.api_base());
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn healthz() -> &'static str {
    "ok"
}

async fn knowledge_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: Option<Query<HashMap<String, String>>>,
) -> Response {
    article(state, ContentType::Knowledge, slug, query).await
}

async fn news_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: Option<Query<HashMap<String, String>>>,
) -> Response {
    article(state, ContentType::News, slug, query).await
}

async fn article(
    state: AppState,
    content_type: ContentType,
    slug: String,
    query: Option<Query<HashMap<String, String>>>,
) -> Response {
    let lang = query.as_ref().and_then(|Query(q)| q.get("lang"));
    state
        .handler
        .handle(content_type, Some(&slug), lang.map(String::as_str))
        .await
}
