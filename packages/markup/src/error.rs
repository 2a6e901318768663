use thiserror::Error;

pub type MarkupResult<T> = Result<T, MarkupError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Offset {offset} is outside the fragment (length {len})")]
    OutOfBounds { offset: usize, len: usize },

    #[error("Range {start}..{end} is empty")]
    EmptyRange { start: usize, end: usize },

    #[error("Range {start}..{end} crosses element boundaries and cannot be wrapped in place")]
    Unwrappable { start: usize, end: usize },

    #[error("No node at path {0:?}")]
    InvalidPath(Vec<usize>),
}

impl MarkupError {
    pub fn out_of_bounds(offset: usize, len: usize) -> Self {
        Self::OutOfBounds { offset, len }
    }
}
