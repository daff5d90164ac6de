//! I/O for voxel volumes and delimited tables
//!
//! Volumes are loaded once before detection and written once after; nothing
//! in this module is called from inside the detection loops.

mod raw;
mod sequence;
mod table;
mod tiff_stack;

pub use raw::{read_raw, read_raw_from_buffer, write_raw, write_raw_to_buffer, RawDataType};
pub use sequence::{frame_files, sorted_files};
pub use table::{
    read_centroid_table, read_contact_pairs, read_contact_table, read_positions, write_centroid_table,
    write_contact_table, CentroidRecord, ContactRecord, PairRecord, ParsedTable, PositionRecord,
    RejectedLine,
};
pub use tiff_stack::{read_tiff_stack, read_tiff_stack_from_buffer, write_tiff_stack, write_tiff_stack_to_buffer};

use crate::error::{Error, Result};
use crate::voxel::VoxelGrid;
use std::path::Path;

/// Read a volume, choosing the codec from the file extension.
///
/// `.tif`/`.tiff` files are read as page stacks. `.raw` files need the
/// dimensions and sample type, which raw files do not carry.
pub fn read_volume<P: AsRef<Path>>(
    path: P,
    raw_layout: Option<((usize, usize, usize), RawDataType)>,
) -> Result<VoxelGrid> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "tif" | "tiff" => read_tiff_stack(path),
        "raw" | "bin" => match raw_layout {
            Some((dims, dtype)) => read_raw(path, dims, dtype),
            None => Err(Error::InvalidParameter {
                name: "raw_layout",
                value: path.display().to_string(),
                reason: "raw volumes need explicit dimensions and sample type".to_string(),
            }),
        },
        other => Err(Error::UnsupportedDataType(format!(
            "unknown volume extension '{}' for {}",
            other,
            path.display()
        ))),
    }
}
