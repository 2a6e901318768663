//! Error types for the editor

use lettercraft_compiler_html::CompileError;
use lettercraft_markup::MarkupError;
use lettercraft_model::UpdateError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Settings update failed: {0}")]
    Update(#[from] UpdateError),

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Edit failed: {0}")]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Select some text first")]
    EmptySelection,

    #[error("An analysis is already in progress")]
    AnalysisPending,

    #[error("Analysis ticket {0} is not the pending request")]
    StaleTicket(u64),
}

/// Failures at the boundary with external services and file input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Unsupported file '{name}' ({mime}): {expected}")]
    UnsupportedInput {
        name: String,
        mime: String,
        expected: &'static str,
    },

    #[error("Service request failed: {0}")]
    Failed(String),

    #[error("Service returned an empty result")]
    EmptyResponse,
}
