//! Shared domain types for the todo feed: the todo record, ids, paging and
//! the error taxonomy used by every other crate.

pub mod api;
pub mod errors;
pub mod ids;
pub mod page;
pub mod todo;

pub use api::{CreateTodoRequest, ErrorBody, ErrorDetail, TodoEnvelope};
pub use errors::{validate_content, TodoError};
pub use ids::TodoId;
pub use page::{PageRequest, TodoPage, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use todo::{Todo, TodoPatch};
