use thiserror::Error;

#[derive(Error, Debug)]
pub enum KgError {
    #[error("Missing field `{field}` in {context}")]
    MissingField { field: String, context: String },
    #[error("Invalid graph shape: {0}")]
    InvalidShape(String),
    #[error("No code assigned to term {term:?}")]
    MissingCode { term: String },
    #[error("Malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("Unknown code {code:?} on line {line}")]
    UnknownCode { code: String, line: usize },
    #[error("Code {code:?} defined twice (line {line})")]
    DuplicateCode { code: String, line: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KgError>;
