//! Error taxonomy for loading, editing and saving documents.

use thiserror::Error;

/// A single page could not be decoded or rasterized.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to render page {page}: {reason}")]
pub struct PageRenderError {
    /// 1-based page number.
    pub page: u32,
    pub reason: String,
}

/// The document or one of its pages failed to parse or render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("failed to open document: {0}")]
    Document(String),

    #[error(transparent)]
    Page(#[from] PageRenderError),
}

/// The rewriting service could not be reached or rejected the request.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{name} is not a PDF file")]
    InvalidFileType { name: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("no changes were made to the text")]
    NoChanges,

    #[error("no PDF loaded")]
    NoDocument,

    #[error("another operation is in progress")]
    Busy,

    #[error("load was superseded by a newer file")]
    Superseded,

    #[error("unknown element {0}")]
    UnknownElement(u32),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unusable response from service: {0}")]
    ResponseFormat(String),

    #[error("invalid service endpoint: {0}")]
    Endpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;

impl EditorError {
    /// `true` for conditions that are reported but are not failures.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NoChanges)
    }

    /// The one-line notification shown to the user for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidFileType { .. } => "Please select a valid PDF file.".to_string(),
            Self::Decode(e) => format!("Failed to load or render PDF: {e}"),
            Self::NoChanges => "No changes were made to the text.".to_string(),
            Self::NoDocument => "No PDF loaded.".to_string(),
            Self::Service(ServiceError::Status { status, body }) => {
                format!("Failed to save PDF. Backend error: {status} {body}")
            }
            Self::Service(e @ ServiceError::Transport(_)) => {
                format!("Failed to save PDF. Ensure the rewriting service is running. Error: {e}")
            }
            Self::ResponseFormat(detail) => format!("Failed to save PDF: {detail}"),
            other => format!("Error: {other}"),
        }
    }
}
