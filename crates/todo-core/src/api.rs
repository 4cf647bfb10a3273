//! Request and response bodies shared by the server and the client.

use serde::{Deserialize, Serialize};

use crate::todo::Todo;

/// Body of `POST /api/todos`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub content: String,
}

/// `{ "todo": ... }` returned by create and toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEnvelope {
    pub todo: Todo,
}

/// Error payload: `{ "error": { "code", "message", "field"? } }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
