//! `TodoServer`: router construction, listener and shutdown handle.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::response::Json;
use axum::routing::{delete, get, put};
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use todo_store::TodoRepo;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: TodoRepo,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(repo: TodoRepo) -> Self {
        Self {
            repo,
            start_time: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route("/api/todos/{id}/toggle-done", put(handlers::toggle_done))
        .route("/api/todos/{id}", delete(handlers::delete_todo))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// The todo HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    state: AppState,
    shutdown: ShutdownCoordinator,
}

impl TodoServer {
    pub fn new(config: ServerConfig, repo: TodoRepo) -> Self {
        Self {
            config,
            state: AppState::new(repo),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Bind the listener and start serving in a background task.
    pub async fn listen(self) -> Result<ServerHandle, std::io::Error> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        info!(
            %addr,
            backend = self.state.repo.store().kind(),
            "todo server started"
        );

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "server exited with error");
            }
        });

        Ok(ServerHandle {
            addr,
            shutdown: self.shutdown,
            timeout: self.config.shutdown_timeout(),
            task,
        })
    }
}

/// Handle returned by [`TodoServer::listen`].
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: ShutdownCoordinator,
    timeout: Duration,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Stop accepting connections and drain in-flight requests.
    pub async fn stop(self) {
        self.shutdown
            .graceful_shutdown(vec![self.task], self.timeout)
            .await;
        info!("todo server stopped");
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let todos = handlers::run_blocking(&state.repo, |repo| Ok(repo.store().count()?)).await?;
    Ok(Json(health::health_check(
        state.start_time,
        todos,
        state.repo.store().kind(),
    )))
}
