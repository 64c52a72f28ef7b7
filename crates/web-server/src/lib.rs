use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use configuration::{Settings, StorageBackend};
use database::{DbRepository, MahasiswaRepository, MemoryRepository};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod http_metrics;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn MahasiswaRepository>,
    pub metrics: http_metrics::Metrics,
}

impl AppState {
    /// Wraps a repository and makes sure the metrics recorder is installed.
    pub fn new(repo: Arc<dyn MahasiswaRepository>) -> Self {
        Self {
            repo,
            metrics: http_metrics::install(),
        }
    }
}

/// Builds the application router with all routes and middleware attached.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/mahasiswa",
            get(handlers::list_mahasiswa).post(handlers::create_mahasiswa),
        )
        .route(
            "/api/mahasiswa/:id",
            get(handlers::get_mahasiswa)
                .put(handlers::update_mahasiswa)
                .delete(handlers::delete_mahasiswa),
        )
        .route("/metrics", get(http_metrics::metrics_handler))
        .fallback(handlers::not_found)
        .with_state(state)
        // Runs after routing, so the matched route pattern is available.
        .layer(middleware::from_fn(http_metrics::track_http_metrics))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Selects the record store named in the settings.
///
/// For PostgreSQL the pool is created lazily and a connectivity check runs in
/// the background; a failed check is logged and startup continues.
pub fn build_repository(settings: &Settings) -> Arc<dyn MahasiswaRepository> {
    match settings.storage {
        StorageBackend::Postgres => {
            let pool = database::connect(&settings.database);
            let check_pool = pool.clone();
            tokio::spawn(async move {
                match database::test_connection(&check_pool).await {
                    Ok(()) => tracing::info!("Database connected successfully."),
                    Err(e) => tracing::warn!(error = %e, "Error connecting to database."),
                }
            });
            Arc::new(DbRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on exit.");
            Arc::new(MemoryRepository::new())
        }
    }
}

/// The main function to configure and run the web server.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let repo = build_repository(&settings);
    let app_state = Arc::new(AppState::new(repo));
    let app = build_router(app_state);

    let addr = settings.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped.");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received.");
}
