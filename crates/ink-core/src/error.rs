//! Error types for the ink pipeline.
//!
//! Nothing here escapes a build: failures are logged and the affected
//! geometry is skipped, so a frame is never interrupted.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InkError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InkError {
    /// The canvas matrix has no inverse, so device-space vertices cannot be
    /// mapped back into content space.
    #[error("matrix is not invertible (determinant {0})")]
    SingularMatrix(f32),

    /// The tessellation backend rejected a polygon.
    #[error("tessellation failed: {0}")]
    Tessellation(String),
}
