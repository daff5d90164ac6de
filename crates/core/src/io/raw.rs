//! Raw binary voxel volumes
//!
//! A raw volume is a headerless sequence of little-endian samples in
//! `(i, j, k)` row-major order, `k` fastest. Skeleton masks exported by
//! thinning tools are typically `u8` raw files.

use crate::error::{Error, Result};
use crate::voxel::VoxelGrid;
use num_traits::NumCast;
use std::fs;
use std::path::Path;

/// Sample type of a raw volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDataType {
    U8,
    U16,
    I32,
}

impl RawDataType {
    /// Bytes per sample
    pub fn size(&self) -> usize {
        match self {
            RawDataType::U8 => 1,
            RawDataType::U16 => 2,
            RawDataType::I32 => 4,
        }
    }
}

impl std::str::FromStr for RawDataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u8" | "uint8" => Ok(RawDataType::U8),
            "u16" | "uint16" => Ok(RawDataType::U16),
            "i32" | "int32" => Ok(RawDataType::I32),
            other => Err(Error::UnsupportedDataType(format!("raw sample type '{}'", other))),
        }
    }
}

/// Read a raw volume file into a VoxelGrid
pub fn read_raw<P: AsRef<Path>>(
    path: P,
    dims: (usize, usize, usize),
    dtype: RawDataType,
) -> Result<VoxelGrid> {
    let bytes = fs::read(path.as_ref())?;
    read_raw_from_buffer(&bytes, dims, dtype)
}

/// Decode a raw volume from an in-memory buffer
pub fn read_raw_from_buffer(
    bytes: &[u8],
    dims: (usize, usize, usize),
    dtype: RawDataType,
) -> Result<VoxelGrid> {
    let (x_dim, y_dim, z_dim) = dims;
    let expected = x_dim
        .checked_mul(y_dim)
        .and_then(|n| n.checked_mul(z_dim))
        .and_then(|n| n.checked_mul(dtype.size()));
    if expected != Some(bytes.len()) {
        return Err(Error::InvalidDimensions {
            x_dim,
            y_dim,
            z_dim,
            len: bytes.len() / dtype.size(),
        });
    }

    let data: Vec<i32> = match dtype {
        RawDataType::U8 => bytes.iter().map(|&b| <i32 as From<u8>>::from(b)).collect(),
        RawDataType::U16 => bytes
            .chunks_exact(2)
            .map(|c| <i32 as From<u16>>::from(u16::from_le_bytes([c[0], c[1]])))
            .collect(),
        RawDataType::I32 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    };

    VoxelGrid::from_vec(data, x_dim, y_dim, z_dim)
}

/// Write a VoxelGrid as a raw volume file
pub fn write_raw<P: AsRef<Path>>(grid: &VoxelGrid, path: P, dtype: RawDataType) -> Result<()> {
    let bytes = write_raw_to_buffer(grid, dtype)?;
    fs::write(path.as_ref(), bytes)?;
    Ok(())
}

/// Encode a VoxelGrid as raw little-endian samples
pub fn write_raw_to_buffer(grid: &VoxelGrid, dtype: RawDataType) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(grid.len() * dtype.size());
    for &v in grid.data().iter() {
        match dtype {
            RawDataType::U8 => out.push(narrow::<u8>(v)?),
            RawDataType::U16 => out.extend_from_slice(&narrow::<u16>(v)?.to_le_bytes()),
            RawDataType::I32 => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
    Ok(out)
}

fn narrow<T: NumCast>(v: i32) -> Result<T> {
    num_traits::cast(v).ok_or_else(|| {
        Error::UnsupportedDataType(format!(
            "value {} does not fit in {}",
            v,
            std::any::type_name::<T>()
        ))
    })
}
