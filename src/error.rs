use thiserror::Error;

/// Structural failures of the map generation core.
///
/// These are programming or wiring errors: mismatched tensor lengths, missing foundation data, invalid dimensions.
/// Data-absence conditions (no hotspots, no rift shoulders, no lane candidates) are never reported through this type;
/// the corresponding tagging pass returns early and records a warning in
/// [`GenerationMetrics`](crate::map_context::GenerationMetrics) instead.
#[derive(Debug, Error)]
pub enum MapGenError {
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("tile ({x}, {y}) is out of bounds for a {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("{name} buffer length mismatch (expected {expected}, received {received})")]
    BufferSizeMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("world model is not initialized or disabled")]
    WorldModelDisabled,
    #[error("missing {name} tensor")]
    MissingTensor { name: &'static str },
    #[error("{name} tensor length mismatch (expected {expected}, received {received})")]
    TensorLengthMismatch {
        name: &'static str,
        expected: usize,
        received: usize,
    },
    #[error(
        "foundation dimensions {found_width}x{found_height} do not match the map {width}x{height}"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },
    #[error("stage \"{stage}\" requires the foundation context but it is unavailable")]
    FoundationUnavailable { stage: String },
    #[error("failed to parse map generation config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to write diagnostics image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T, E = MapGenError> = std::result::Result<T, E>;
