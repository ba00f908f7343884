use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error(
        "rectangle exceeds atlas bound: padded size needed ({width}px, {height}px) larger than atlas size ({size}px)"
    )]
    OversizedRectangle { width: u32, height: u32, size: u32 },
    #[error(
        "insufficient atlas capacity: total padded area needed ({required}px) exceeds {available}px ({size} x {size} at {ceiling:.2} space utilization)"
    )]
    CapacityExceeded {
        required: u64,
        available: u64,
        size: u32,
        ceiling: f64,
    },
    #[error("no space for rectangle #{index} (padded {width}x{height}); free-space list is inconsistent")]
    PackingExhausted { index: usize, width: u32, height: u32 },
    #[error("invalid source image `{key}`: {reason}")]
    InvalidSourceImage { key: String, reason: String },
    #[error("texture #{index} cannot be composited: {detail}")]
    CompositeOutOfBounds { index: usize, detail: String },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Nothing to pack")]
    Empty,
}

pub type Result<T> = std::result::Result<T, AtlasError>;
