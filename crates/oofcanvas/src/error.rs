// Imports
use thiserror::Error;

/// Errors returned by the canvas.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("pixels per unit must be positive and finite, got {0}")]
    InvalidPpu(f64),
    #[error("no layer with name \"{0}\"")]
    LayerNotFound(String),
    #[error("the layer key does not refer to a layer of this canvas")]
    InvalidLayerKey,
    #[error("layer index {index} is out of range, the canvas has {len} layers")]
    LayerIndexOutOfRange { index: usize, len: usize },
    #[error("the item key does not refer to a item of this canvas")]
    ItemNotFound,
    #[error("bitmap of size {width}x{height} is too large")]
    BitmapTooLarge { width: u64, height: u64 },
    #[error("there is nothing to draw")]
    NothingToDraw,
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("writing the cairo surface failed: {0}")]
    CairoIo(#[from] cairo::IoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("scene (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rendering failed, Err: {0:?}")]
    Render(#[from] anyhow::Error),
}
