use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
