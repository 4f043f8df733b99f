use thiserror::Error;

/// Failures reported by [`Layout`](crate::layout::Layout).
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("No free space left in the layout for a {width}x{height} rectangle")]
    OutOfSpace { width: u32, height: u32 },
    #[error("Rectangle must have a non-zero size, got {width}x{height}")]
    ZeroSized { width: u32, height: u32 },
    #[error("At most one axis of a layout may be open-ended")]
    Unbounded,
}

#[derive(Debug, Error)]
pub enum SpritifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to pack")]
    Empty,
}

pub type Result<T> = std::result::Result<T, SpritifyError>;
