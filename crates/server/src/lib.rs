//! scholar-server: HTTP JSON API for student exam results.
//!
//! Exposes the query and mutation services as an async HTTP service using
//! `axum` + `tokio`.
//!
//! Security features:
//! - CORS headers on all responses (permissive unless `cors_allow_any` is off)
//! - Optional API key authentication for POST, PUT and DELETE
//! - Request body size limit
//!
//! Endpoints:
//! - GET    /health                            - Server status
//! - GET    /api/results                       - Paginated, filtered, sorted list
//! - POST   /api/results                       - Create a result
//! - GET    /api/results/{id}                  - One result, student fully expanded
//! - PUT    /api/results/{id}                  - Partial update
//! - DELETE /api/results/{id}                  - Delete
//! - GET    /api/results/student/{studentId}   - All results for a student
//! - GET    /api/results/class/{className}     - All results for a class (`?exam=`)
//! - GET    /api/results/statistics            - Aggregates (`?className=&exam=`)
//! - GET    /api/results/recent/{limit}        - Most recently created results
//! - GET    /api/students                      - Students in name order (`?className=`)
//! - POST   /api/students                      - Create a student
//! - GET    /api/students/{id}                 - One student
//! - PUT    /api/students/{id}                 - Partial update
//! - DELETE /api/students/{id}                 - Delete (results are kept)
//!
//! All responses use Content-Type: application/json.

pub mod config;
mod envelope;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};
use scholar_storage::{MemoryStore, RecordStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use envelope::{ApiError, Envelope};
pub use state::AppState;

use self::handlers::{
    handle_class_results, handle_create_result, handle_create_student, handle_delete_result,
    handle_delete_student, handle_get_result, handle_get_student, handle_health,
    handle_list_results, handle_list_students, handle_not_found, handle_recent_results,
    handle_recent_results_default, handle_statistics, handle_student_results,
    handle_update_result, handle_update_student,
};
use self::middleware::auth_middleware;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Build the full application router over `store`.
pub fn build_router(store: Arc<dyn RecordStore>, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState::new(store, config));

    let cors = if config.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/results",
            get(handle_list_results).post(handle_create_result),
        )
        .route("/api/results/statistics", get(handle_statistics))
        .route("/api/results/recent", get(handle_recent_results_default))
        .route("/api/results/recent/{limit}", get(handle_recent_results))
        .route(
            "/api/results/student/{student_id}",
            get(handle_student_results),
        )
        .route("/api/results/class/{class_name}", get(handle_class_results))
        .route(
            "/api/results/{id}",
            get(handle_get_result)
                .put(handle_update_result)
                .delete(handle_delete_result),
        )
        .route(
            "/api/students",
            get(handle_list_students).post(handle_create_student),
        )
        .route(
            "/api/students/{id}",
            get(handle_get_student)
                .put(handle_update_student)
                .delete(handle_delete_student),
        )
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the configured store and serve the API until Ctrl+C.
///
/// When TLS cert/key paths are configured and the `tls` feature is on, the
/// server listens over HTTPS using `axum-server` with rustls.
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn RecordStore> = match &config.data_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "using data file");
            Arc::new(MemoryStore::open(path).await?)
        }
        None => {
            tracing::warn!("no data file configured, records live in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled for mutating routes");
    }

    let app = build_router(store, &config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    // TLS support via axum-server + rustls (requires `tls` feature)
    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&config.tls_cert, &config.tls_key) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;
        tracing::info!("scholar listening on https://{addr}");
        axum_server::bind_rustls(addr, tls)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await?;
        return Ok(());
    }

    #[cfg(not(feature = "tls"))]
    if config.tls_cert.is_some() || config.tls_key.is_some() {
        tracing::warn!("TLS paths configured but built without the `tls` feature, serving plain HTTP");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("scholar listening on http://{addr}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
