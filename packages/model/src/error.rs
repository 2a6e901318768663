use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpdateError {
    #[error("Invalid variable key '{0}': use letters, digits and underscores only")]
    InvalidKey(String),

    #[error("Variable already registered: {0}")]
    DuplicateKey(String),

    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("Header line not found: {0}")]
    HeaderLineNotFound(String),

    #[error("Signature not found: {0}")]
    SignatureNotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Unknown unit '{0}' (expected mm, cm or in)")]
    UnknownUnit(String),

    #[error("Analysis result is missing {0}")]
    AnalysisIncomplete(&'static str),
}
