/// Domain-level error taxonomy shared by the repository and both controllers.
///
/// Validation is always caller-caused, `NotFound` refers to an unknown todo id,
/// and `StorageUnavailable` covers everything the backend could not do.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("Todo with id \"{0}\" not found")]
    NotFound(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound(_) => "not_found",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

/// Check that `content` is usable as todo text.
pub fn validate_content(content: &str) -> Result<(), TodoError> {
    if content.is_empty() {
        return Err(TodoError::validation_field(
            "content",
            "content must be a non-empty string",
        ));
    }
    Ok(())
}
