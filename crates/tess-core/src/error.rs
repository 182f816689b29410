use thiserror::Error;

#[derive(Debug, Error)]
pub enum TessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index overflow: {vertices} vertices exceed the {max} addressable by the index format")]
    IndexOverflow { vertices: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, TessError>;
