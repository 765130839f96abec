use anyhow::{Context, Result};
use axum::{Router, http::Method, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Build the proxy application. Every response, errors included, passes the CORS layer.
pub fn app(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let mut app = Router::new()
        .nest("/api", api::router())
        .route("/healthz", get(healthz));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
    .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

pub async fn run(server: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(state, server.static_dir.as_deref());
    let addr = server.bind_address();

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&server.tls_cert_path, &server.tls_key_path) {
        return run_tls(&addr, cert, key, app).await;
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("UV proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("UV proxy stopped");
    Ok(())
}

#[cfg(feature = "tls")]
async fn run_tls(addr: &str, cert: &str, key: &str, app: Router) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let socket: std::net::SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid bind address {addr}"))?;
    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS material from {cert} and {key}"))?;

    tracing::info!("UV proxy listening on https://{}", addr);
    axum_server::bind_rustls(socket, tls)
        .serve(app.into_make_service())
        .await
        .context("HTTPS server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
