//! # todo-client
//!
//! Client side of the todo feed:
//!
//! - [`TodoApi`]: typed reqwest wrapper for the four `/api/todos` endpoints
//! - [`TodoController`]: page-size-2 listing, local validation, content filter
//! - [`TodoFeed`]: in-memory view model with optimistic toggles

#![deny(unsafe_code)]

pub mod api;
pub mod controller;
pub mod error;
pub mod feed;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{TodoApi, TodoService};
pub use controller::{filter_todos_by_content, TodoController, CLIENT_PAGE_SIZE};
pub use error::ClientError;
pub use feed::{SyncState, TodoFeed};
