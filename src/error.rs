use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Parsing error: {0}")]
    Parse(String),
    #[error("No class declaration at offset {0}")]
    NoClassAtOffset(usize),
    #[error("Unknown component kind `{0}` (expected `activity` or `fragment`)")]
    UnknownKind(String),
    #[error("`{0}` is not a valid layout name")]
    InvalidToken(String),
    #[error("Failed to create {method}: {reason}")]
    Synthesis { method: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, GenError>;
