pub mod handler;

use crate::repositories::BookRepository;
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Debug)]
pub struct AppState<BR: BookRepository> {
    pub book_repo: Arc<BR>,
}

impl<BR: BookRepository> AppState<BR> {
    pub fn new(book_repo: Arc<BR>) -> Self {
        Self { book_repo }
    }
}

impl<BR: BookRepository> Clone for AppState<BR> {
    fn clone(&self) -> Self {
        Self {
            book_repo: Arc::clone(&self.book_repo),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<BR: BookRepository>(
        state: AppState<BR>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = router(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self
            .listener
            .local_addr()
            .context("Failed to read listener address")?;
        tracing::info!(%addr, "listening");
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

pub fn router<BR: BookRepository>(state: AppState<BR>) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes<BR: BookRepository>() -> Router<AppState<BR>> {
    Router::new().route("/books", get(handler::list_books::<BR>))
}
