//! Multi-page TIFF volumes
//!
//! Each TIFF page is one `i` slice of the volume; page rows map to `j` and
//! page columns to `k`. This matches how label stacks are written by the
//! usual segmentation tools (pages, rows, columns).

use crate::error::{Error, Result};
use crate::voxel::VoxelGrid;
use num_traits::NumCast;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::Gray32;
use tiff::encoder::TiffEncoder;

/// Read a multi-page TIFF into a VoxelGrid
pub fn read_tiff_stack<P: AsRef<Path>>(path: P) -> Result<VoxelGrid> {
    let file = File::open(path.as_ref())?;
    decode_stack(BufReader::new(file))
}

/// Read a multi-page TIFF from an in-memory buffer
pub fn read_tiff_stack_from_buffer(data: &[u8]) -> Result<VoxelGrid> {
    decode_stack(Cursor::new(data))
}

fn decode_stack<R>(reader: R) -> Result<VoxelGrid>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Tiff(format!("decode error: {}", e)))?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Tiff(format!("cannot read dimensions: {}", e)))?;
    let y_dim = height as usize;
    let z_dim = width as usize;

    let mut data: Vec<i32> = Vec::new();
    let mut pages = 0usize;
    loop {
        let (w, h) = decoder
            .dimensions()
            .map_err(|e| Error::Tiff(format!("cannot read dimensions of page {}: {}", pages, e)))?;
        if (h as usize, w as usize) != (y_dim, z_dim) {
            return Err(Error::DimensionMismatch {
                expected: (pages + 1, y_dim, z_dim),
                actual: (pages + 1, h as usize, w as usize),
            });
        }

        let page = decoder
            .read_image()
            .map_err(|e| Error::Tiff(format!("cannot read page {}: {}", pages, e)))?;
        let before = data.len();
        append_samples(page, &mut data)?;
        if data.len() - before != y_dim * z_dim {
            return Err(Error::UnsupportedDataType(format!(
                "page {} holds {} samples, expected {} (multi-channel pages are not voxel labels)",
                pages,
                data.len() - before,
                y_dim * z_dim
            )));
        }
        pages += 1;

        if !decoder.more_images() {
            break;
        }
        decoder
            .next_image()
            .map_err(|e| Error::Tiff(format!("cannot advance to page {}: {}", pages, e)))?;
    }

    VoxelGrid::from_vec(data, pages, y_dim, z_dim)
}

fn append_samples(page: DecodingResult, out: &mut Vec<i32>) -> Result<()> {
    match page {
        DecodingResult::U8(buf) => extend_cast(&buf, out),
        DecodingResult::U16(buf) => extend_cast(&buf, out),
        DecodingResult::U32(buf) => extend_cast(&buf, out),
        DecodingResult::I8(buf) => extend_cast(&buf, out),
        DecodingResult::I16(buf) => extend_cast(&buf, out),
        DecodingResult::I32(buf) => extend_cast(&buf, out),
        _ => Err(Error::UnsupportedDataType(
            "only integer TIFF samples can hold voxel labels".to_string(),
        )),
    }
}

fn extend_cast<T: NumCast + Copy + std::fmt::Display>(buf: &[T], out: &mut Vec<i32>) -> Result<()> {
    out.reserve(buf.len());
    for &v in buf {
        let label: i32 = num_traits::cast(v)
            .ok_or_else(|| Error::UnsupportedDataType(format!("sample {} does not fit in i32", v)))?;
        out.push(label);
    }
    Ok(())
}

/// Write a VoxelGrid as a multi-page 32-bit TIFF, one page per `i` slice
pub fn write_tiff_stack<P: AsRef<Path>>(grid: &VoxelGrid, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_stack(grid, BufWriter::new(file))
}

/// Write a VoxelGrid into an in-memory TIFF buffer
pub fn write_tiff_stack_to_buffer(grid: &VoxelGrid) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_stack(grid, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_stack<W>(grid: &VoxelGrid, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    grid.ensure_not_empty()?;
    let (x_dim, y_dim, z_dim) = grid.dims();

    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Tiff(format!("encoder error: {}", e)))?;

    for i in 0..x_dim {
        let mut page: Vec<u32> = Vec::with_capacity(y_dim * z_dim);
        for j in 0..y_dim {
            for k in 0..z_dim {
                let v = grid.at(i, j, k);
                let sample = u32::try_from(v).map_err(|_| {
                    Error::UnsupportedDataType(format!("negative label {} at ({}, {}, {})", v, i, j, k))
                })?;
                page.push(sample);
            }
        }
        encoder
            .write_image::<Gray32>(z_dim as u32, y_dim as u32, &page)
            .map_err(|e| Error::Tiff(format!("cannot write page {}: {}", i, e)))?;
    }

    Ok(())
}
