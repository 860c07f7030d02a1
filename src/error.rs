use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClasstableError {
    #[error("error reading file")]
    Io(#[from] std::io::Error),

    #[error("malformed json")]
    Json(#[from] serde_json::Error),
}
