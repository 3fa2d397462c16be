use book_catalog::config::Config;
use book_catalog::http::{AppState, HttpServer, HttpServerConfig};
use book_catalog::sqlite::Sqlite;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("book_catalog=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let sqlite = Sqlite::new(&config).await?;
    tracing::info!(url = config.database_url(), "connected to database");

    let state = AppState::new(Arc::new(sqlite));
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
