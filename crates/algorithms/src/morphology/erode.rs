//! Morphological erosion of labeled voxel grids
//!
//! Removes the outer shell of every foreground region: a voxel is eroded
//! when one of its six face neighbors is background. Contact faces between
//! two grains are not background, so they survive until the grains thin
//! out around them.

use crate::maybe_rayon::*;
use grainlink_core::voxel::{Voxel, VoxelGrid};
use grainlink_core::{Algorithm, Error, Result};

/// Parameters for morphological erosion
#[derive(Debug, Clone)]
pub struct ErodeParams {
    /// Number of successive erosion steps
    pub steps: usize,
}

impl Default for ErodeParams {
    fn default() -> Self {
        Self { steps: 1 }
    }
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = VoxelGrid;
    type Output = VoxelGrid;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "6-connected morphological erosion of a labeled voxel grid"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        Ok(erode_steps(&input, params.steps))
    }
}

/// Whether a voxel has at least one in-bounds background face neighbor.
///
/// Sides that fall outside the grid are ignored: the grid edge is open,
/// not an implicit background border.
#[inline]
pub fn touches_background(grid: &VoxelGrid, v: Voxel) -> bool {
    grid.face_neighbors(v).any(|n| grid.at_voxel(n) == 0)
}

/// Perform one erosion step, returning a new grid.
///
/// Every foreground voxel with an in-bounds background neighbor becomes
/// background; all other voxels, background included, are copied. The
/// input is never modified.
///
/// A foreground voxel on the grid border is only eroded if one of its
/// in-bounds neighbors is background. Libraries that pad the image with
/// background erode such voxels unconditionally, which gives different
/// contact strengths.
pub fn erode(grid: &VoxelGrid) -> VoxelGrid {
    let (x_dim, y_dim, z_dim) = grid.dims();

    let eroded: Vec<Voxel> = (0..x_dim)
        .into_par_iter()
        .flat_map(|i| {
            let mut slab = Vec::new();
            for j in 0..y_dim {
                for k in 0..z_dim {
                    if grid.at(i, j, k) == 0 {
                        continue;
                    }
                    let v = Voxel::new(i, j, k);
                    if touches_background(grid, v) {
                        slab.push(v);
                    }
                }
            }
            slab
        })
        .collect();

    let mut output = grid.clone();
    let data = output.data_mut();
    for v in eroded {
        data[(v.i, v.j, v.k)] = 0;
    }
    output
}

/// Apply `steps` successive erosions
pub fn erode_steps(grid: &VoxelGrid, steps: usize) -> VoxelGrid {
    let mut current = grid.clone();
    for _ in 0..steps {
        current = erode(&current);
    }
    current
}
