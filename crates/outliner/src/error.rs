#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Input directory not found: {0}")]
    InputNotFound(String),

    #[error("Invalid heuristics file {path}: {reason}")]
    InvalidHeuristics { path: String, reason: String },

    #[error("{failed} of {total} documents failed")]
    BatchFailed { failed: usize, total: usize },
}
