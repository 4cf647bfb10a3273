//! # todo-server
//!
//! Axum HTTP server for the todo feed.
//!
//! - `GET /api/todos`, `POST /api/todos`
//! - `PUT /api/todos/{id}/toggle-done`, `DELETE /api/todos/{id}`
//! - `GET /health`
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, ServerHandle, TodoServer};
pub use shutdown::ShutdownCoordinator;
