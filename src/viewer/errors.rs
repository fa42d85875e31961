use thiserror::Error;

pub type ViewerResult<T> = Result<T, ViewerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    /// Row limit outside 1..=1000
    #[error("Row limit must be between 1 and {max}, got {got}")]
    InvalidLimit { got: u32, max: u32 },
}
