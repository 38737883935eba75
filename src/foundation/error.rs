/// Crate-wide result alias.
pub type TrellisResult<T> = Result<T, TrellisError>;

/// Errors surfaced by fallible trellis operations.
///
/// Per-frame drawing never fails; these cover document/config loading and raster output.
#[derive(thiserror::Error, Debug)]
pub enum TrellisError {
    /// Input document or options violate a contract.
    #[error("validation error: {0}")]
    Validation(String),

    /// Tree projection or grid assignment could not be produced.
    #[error("layout error: {0}")]
    Layout(String),

    /// Raster backend failure.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrellisError {
    /// Build a [`TrellisError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrellisError::Layout`].
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`TrellisError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TrellisError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
