//! Grain centroids
//!
//! The centroid of a grain is the rounded mean coordinate of the voxels of
//! one connected region. It need not lie inside the grain (concave or
//! ring-shaped grains), which the seeded-growth detector has to handle.

use super::components::regions_of;
use grainlink_core::io::CentroidRecord;
use grainlink_core::voxel::{Voxel, VoxelGrid};
use grainlink_core::{Algorithm, Error, Result};
use tracing::debug;

/// Representative voxel of one grain region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centroid {
    pub voxel: Voxel,
    pub label: i32,
    /// Number of voxels in the region (0 when loaded from a table)
    pub voxel_count: usize,
}

impl Centroid {
    pub fn new(voxel: Voxel, label: i32) -> Self {
        Self {
            voxel,
            label,
            voxel_count: 0,
        }
    }

    /// Position as floating point `[x, y, z]`
    pub fn position(&self) -> [f64; 3] {
        [self.voxel.i as f64, self.voxel.j as f64, self.voxel.k as f64]
    }
}

impl From<CentroidRecord> for Centroid {
    fn from(r: CentroidRecord) -> Self {
        Centroid::new(Voxel::new(r.x, r.y, r.z), r.label)
    }
}

impl From<&Centroid> for CentroidRecord {
    fn from(c: &Centroid) -> Self {
        CentroidRecord {
            x: c.voxel.i,
            y: c.voxel.j,
            z: c.voxel.k,
            label: c.label,
        }
    }
}

/// Parameters for centroid extraction
#[derive(Debug, Clone)]
pub struct CentroidParams {
    /// Regions with fewer voxels are skipped
    pub min_voxels: usize,
}

impl Default for CentroidParams {
    fn default() -> Self {
        Self { min_voxels: 1 }
    }
}

/// Centroid extraction algorithm
#[derive(Debug, Clone, Default)]
pub struct Centroids;

impl Algorithm for Centroids {
    type Input = VoxelGrid;
    type Output = Vec<Centroid>;
    type Params = CentroidParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Centroids"
    }

    fn description(&self) -> &'static str {
        "Rounded mean voxel of every connected grain region"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        input.ensure_not_empty()?;
        Ok(centroids(&input, &params))
    }
}

/// Compute one centroid per connected region of equal positive label.
///
/// Coordinates are the mean voxel index rounded to the nearest integer
/// (halves away from zero). A label split into several disconnected pieces
/// gets one centroid per piece. Output is sorted by label, then position.
pub fn centroids(labels: &VoxelGrid, params: &CentroidParams) -> Vec<Centroid> {
    let regions = regions_of(labels);
    let mut out: Vec<Centroid> = regions
        .iter()
        .filter(|r| r.voxels.len() >= params.min_voxels.max(1))
        .map(|r| {
            let n = r.voxels.len() as f64;
            let (si, sj, sk) = r.voxels.iter().fold((0usize, 0usize, 0usize), |acc, v| {
                (acc.0 + v.i, acc.1 + v.j, acc.2 + v.k)
            });
            Centroid {
                voxel: Voxel::new(
                    (si as f64 / n).round() as usize,
                    (sj as f64 / n).round() as usize,
                    (sk as f64 / n).round() as usize,
                ),
                label: r.value,
                voxel_count: r.voxels.len(),
            }
        })
        .collect();

    debug!(
        regions = regions.len(),
        kept = out.len(),
        "centroid extraction"
    );

    out.sort_by_key(|c| (c.label, c.voxel));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_centroid() {
        let mut grid = VoxelGrid::new(6, 6, 6);
        for i in 1..4 {
            for j in 2..5 {
                for k in 0..3 {
                    grid.set(i, j, k, 8).unwrap();
                }
            }
        }
        let c = centroids(&grid, &CentroidParams::default());
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].voxel, Voxel::new(2, 3, 1));
        assert_eq!(c[0].label, 8);
        assert_eq!(c[0].voxel_count, 27);
        let p = c[0].position();
        assert_relative_eq!(p[0], 2.0);
        assert_relative_eq!(p[1], 3.0);
    }

    #[test]
    fn test_mean_is_rounded() {
        // Voxels at k = 0, 1 → mean 0.5 rounds to 1
        let grid = VoxelGrid::from_vec(vec![5, 5, 0], 1, 1, 3).unwrap();
        let c = centroids(&grid, &CentroidParams::default());
        assert_eq!(c[0].voxel, Voxel::new(0, 0, 1));
    }

    #[test]
    fn test_pieces_get_separate_centroids_sorted_by_label() {
        let grid = VoxelGrid::from_vec(vec![9, 0, 2, 0, 9, 9], 1, 1, 6).unwrap();
        let c = centroids(&grid, &CentroidParams::default());
        let summary: Vec<(i32, usize)> = c.iter().map(|c| (c.label, c.voxel.k)).collect();
        assert_eq!(summary, vec![(2, 2), (9, 0), (9, 5)]);
    }

    #[test]
    fn test_min_voxels_filter() {
        let grid = VoxelGrid::from_vec(vec![1, 0, 2, 2], 1, 1, 4).unwrap();
        let c = Centroids
            .execute(grid, CentroidParams { min_voxels: 2 })
            .unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].label, 2);
    }

    #[test]
    fn test_record_conversion() {
        let c = Centroid::new(Voxel::new(1, 2, 3), 4);
        let r = CentroidRecord::from(&c);
        assert_eq!(r, CentroidRecord { x: 1, y: 2, z: 3, label: 4 });
        assert_eq!(Centroid::from(r), c);
    }
}
