pub mod catalog;
pub mod config;
pub mod discovery;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod ratings;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("Server error: {0}")]
    Server(String),
}

/// Wire up the catalog, rating lookup and vocabulary, then serve the API.
pub async fn run(config: config::Config) -> Result<(), ServerError> {
    let api_key = config.catalog_api_key()?.to_string();

    info!("Catalog at {}", config.catalog.base_url);
    if config.debug_logs {
        info!("Debug logging enabled");
    }

    let vocab = Arc::new(query::Vocabulary::load(&config.discovery.genres_file));

    let cache = Arc::new(catalog::ResponseCache::new(&config.cache));
    let tmdb = Arc::new(catalog::TmdbClient::new(&config.catalog, &api_key, cache)?);

    let omdb = Arc::new(
        ratings::OmdbClient::new(&config.ratings, &config.cache)
            .map_err(|e| ServerError::Server(format!("Failed to create rating client: {}", e)))?,
    );
    if config.ratings.api_key.is_none() {
        info!("No rating API key configured, IMDb ratings disabled");
    }

    let discovery = Arc::new(discovery::Discovery::new(
        vocab,
        tmdb,
        omdb,
        config.discovery.fetch_limit,
        config.discovery.page_size,
    ));

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let state = server::AppState::new(config, discovery);
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}
