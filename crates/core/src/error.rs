//! Error types for grainlink

use thiserror::Error;

/// Main error type for grainlink operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid dimensions: {x_dim}x{y_dim}x{z_dim} does not hold {len} voxels")]
    InvalidDimensions {
        x_dim: usize,
        y_dim: usize,
        z_dim: usize,
        len: usize,
    },

    #[error("Index out of bounds: ({i}, {j}, {k}) in grid of size {dims:?}")]
    IndexOutOfBounds {
        i: usize,
        j: usize,
        k: usize,
        dims: (usize, usize, usize),
    },

    #[error("Grid dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Grid is empty: dimensions {0:?}")]
    EmptyGrid((usize, usize, usize)),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for grainlink operations
pub type Result<T> = std::result::Result<T, Error>;
