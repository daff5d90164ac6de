//! Main VoxelGrid type

use crate::error::{Error, Result};
use crate::voxel::{FaceNeighbors, Voxel};
use ndarray::{Array3, ArrayView3};
use std::collections::BTreeSet;

/// A dense labeled 3D voxel grid.
///
/// Values are stored row-major with `k` (z) varying fastest, so the flat
/// position of `(i, j, k)` is `k + z_dim * (j + y_dim * i)`. A value of `0`
/// is background; positive values are grain labels.
///
/// # Example
///
/// ```ignore
/// use grainlink_core::VoxelGrid;
///
/// let mut grid = VoxelGrid::new(4, 4, 4);
/// grid.set(1, 2, 3, 7)?;
/// assert_eq!(grid.get(1, 2, 3)?, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    /// Voxel data in standard (C) layout, shape (x_dim, y_dim, z_dim)
    data: Array3<i32>,
}

impl VoxelGrid {
    /// Create a new grid filled with background
    pub fn new(x_dim: usize, y_dim: usize, z_dim: usize) -> Self {
        Self {
            data: Array3::zeros((x_dim, y_dim, z_dim)),
        }
    }

    /// Create a new grid filled with a specific value
    pub fn filled(x_dim: usize, y_dim: usize, z_dim: usize, value: i32) -> Self {
        Self {
            data: Array3::from_elem((x_dim, y_dim, z_dim), value),
        }
    }

    /// Create a grid from a flat vector in `(i, j, k)` row-major order
    pub fn from_vec(data: Vec<i32>, x_dim: usize, y_dim: usize, z_dim: usize) -> Result<Self> {
        let expected = x_dim
            .checked_mul(y_dim)
            .and_then(|v| v.checked_mul(z_dim));
        if expected != Some(data.len()) {
            return Err(Error::InvalidDimensions {
                x_dim,
                y_dim,
                z_dim,
                len: data.len(),
            });
        }

        let array = Array3::from_shape_vec((x_dim, y_dim, z_dim), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self { data: array })
    }

    /// Create a grid from an ndarray.
    ///
    /// Non-standard layouts are copied into standard layout so that the flat
    /// index formula always holds.
    pub fn from_array(data: Array3<i32>) -> Self {
        if data.is_standard_layout() {
            Self { data }
        } else {
            Self {
                data: data.as_standard_layout().into_owned(),
            }
        }
    }

    /// Create a background grid with the same dimensions
    pub fn like(&self) -> Self {
        Self {
            data: Array3::zeros(self.data.dim()),
        }
    }

    // Dimensions

    pub fn x_dim(&self) -> usize {
        self.data.dim().0
    }

    pub fn y_dim(&self) -> usize {
        self.data.dim().1
    }

    pub fn z_dim(&self) -> usize {
        self.data.dim().2
    }

    /// Dimensions as (x_dim, y_dim, z_dim)
    pub fn dims(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Total number of voxels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the grid holds no voxels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Largest of the three dimensions
    pub fn max_dim(&self) -> usize {
        let (x, y, z) = self.dims();
        x.max(y).max(z)
    }

    // Data access

    /// Flat position of `(i, j, k)`: `k + z_dim * (j + y_dim * i)`
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        k + self.z_dim() * (j + self.y_dim() * i)
    }

    /// Whether a signed coordinate lies inside the grid
    pub fn contains(&self, i: isize, j: isize, k: isize) -> bool {
        let (x, y, z) = self.dims();
        i >= 0 && j >= 0 && k >= 0 && (i as usize) < x && (j as usize) < y && (k as usize) < z
    }

    /// Get value at (i, j, k)
    pub fn get(&self, i: usize, j: usize, k: usize) -> Result<i32> {
        self.data
            .get((i, j, k))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                i,
                j,
                k,
                dims: self.dims(),
            })
    }

    /// Value at (i, j, k) for callers that already checked bounds.
    ///
    /// # Panics
    /// Panics when any coordinate is outside `[0, dim)`. An out-of-range
    /// access here is a programming error, not bad input.
    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> i32 {
        self.data[(i, j, k)]
    }

    /// Value at a voxel, see [`VoxelGrid::at`]
    #[inline]
    pub fn at_voxel(&self, v: Voxel) -> i32 {
        self.data[(v.i, v.j, v.k)]
    }

    /// Set value at (i, j, k)
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: i32) -> Result<()> {
        match self.data.get_mut((i, j, k)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                i,
                j,
                k,
                dims: self.dims(),
            }),
        }
    }

    /// In-bounds 6-connected neighbors of a voxel
    pub fn face_neighbors(&self, v: Voxel) -> FaceNeighbors {
        FaceNeighbors::new(v, self.dims())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView3<'_, i32> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array3<i32> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array3<i32> {
        &mut self.data
    }

    /// Flat slice of the voxel values in index order.
    ///
    /// `None` only if the array was replaced through `data_mut` with one in
    /// a non-standard layout.
    pub fn as_slice(&self) -> Option<&[i32]> {
        self.data.as_slice()
    }

    /// Consume the grid and return the underlying array
    pub fn into_array(self) -> Array3<i32> {
        self.data
    }

    // Content queries

    /// Number of non-background voxels
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Distinct positive labels present in the grid
    pub fn labels(&self) -> BTreeSet<i32> {
        self.data.iter().copied().filter(|&v| v > 0).collect()
    }

    /// Iterate over foreground voxels in index order
    pub fn foreground_voxels(&self) -> impl Iterator<Item = (Voxel, i32)> + '_ {
        self.data
            .indexed_iter()
            .filter(|(_, &v)| v != 0)
            .map(|((i, j, k), &v)| (Voxel::new(i, j, k), v))
    }

    /// Fail with `DimensionMismatch` unless `other` has the same shape
    pub fn ensure_same_dims(&self, other: &VoxelGrid) -> Result<()> {
        if self.dims() != other.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                actual: other.dims(),
            });
        }
        Ok(())
    }

    /// Fail with `EmptyGrid` when the grid holds no voxels
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyGrid(self.dims()));
        }
        Ok(())
    }

    /// Basic content summary
    pub fn summary(&self) -> GridSummary {
        let mut foreground = 0;
        let mut min_label = None;
        let mut max_label = None;
        for &v in self.data.iter() {
            if v == 0 {
                continue;
            }
            foreground += 1;
            if v > 0 {
                min_label = Some(min_label.map_or(v, |m: i32| m.min(v)));
                max_label = Some(max_label.map_or(v, |m: i32| m.max(v)));
            }
        }

        GridSummary {
            dims: self.dims(),
            foreground,
            background: self.len() - foreground,
            label_count: self.labels().len(),
            min_label,
            max_label,
        }
    }
}

/// Content summary of a voxel grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSummary {
    pub dims: (usize, usize, usize),
    pub foreground: usize,
    pub background: usize,
    pub label_count: usize,
    pub min_label: Option<i32>,
    pub max_label: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = VoxelGrid::new(3, 4, 5);
        assert_eq!(grid.dims(), (3, 4, 5));
        assert_eq!(grid.len(), 60);
        assert_eq!(grid.max_dim(), 5);
        assert_eq!(grid.foreground_count(), 0);
    }

    #[test]
    fn test_flat_index_matches_layout() {
        let data: Vec<i32> = (0..24).collect();
        let grid = VoxelGrid::from_vec(data, 2, 3, 4).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    let idx = grid.flat_index(i, j, k);
                    assert_eq!(idx, k + 4 * (j + 3 * i));
                    assert_eq!(grid.at(i, j, k), idx as i32);
                    assert_eq!(grid.as_slice().unwrap()[idx], idx as i32);
                }
            }
        }
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = VoxelGrid::from_vec(vec![1; 10], 2, 2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { len: 10, .. }));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = VoxelGrid::new(2, 2, 2);
        assert!(grid.get(1, 1, 1).is_ok());
        assert!(matches!(
            grid.get(2, 0, 0),
            Err(Error::IndexOutOfBounds { i: 2, .. })
        ));
        assert!(grid.get(0, 0, 2).is_err());
    }

    #[test]
    #[should_panic]
    fn test_at_out_of_bounds_panics() {
        let grid = VoxelGrid::new(2, 2, 2);
        grid.at(0, 5, 0);
    }

    #[test]
    fn test_set_and_labels() {
        let mut grid = VoxelGrid::new(3, 3, 3);
        grid.set(0, 0, 0, 4).unwrap();
        grid.set(2, 2, 2, 1).unwrap();
        grid.set(1, 1, 1, 4).unwrap();
        assert!(grid.set(3, 0, 0, 1).is_err());
        assert_eq!(grid.labels().into_iter().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(grid.foreground_count(), 3);
    }

    #[test]
    fn test_contains() {
        let grid = VoxelGrid::new(2, 3, 4);
        assert!(grid.contains(0, 0, 0));
        assert!(grid.contains(1, 2, 3));
        assert!(!grid.contains(-1, 0, 0));
        assert!(!grid.contains(0, 3, 0));
        assert!(!grid.contains(0, 0, 4));
    }

    #[test]
    fn test_dimension_checks() {
        let a = VoxelGrid::new(2, 2, 2);
        let b = VoxelGrid::new(2, 2, 3);
        assert!(a.ensure_same_dims(&a.like()).is_ok());
        assert!(matches!(
            a.ensure_same_dims(&b),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(VoxelGrid::new(0, 4, 4).ensure_not_empty().is_err());
    }

    #[test]
    fn test_summary() {
        let grid = VoxelGrid::from_vec(vec![0, 3, 3, 0, 7, 0, 0, 0], 2, 2, 2).unwrap();
        let s = grid.summary();
        assert_eq!(s.foreground, 3);
        assert_eq!(s.background, 5);
        assert_eq!(s.label_count, 2);
        assert_eq!(s.min_label, Some(3));
        assert_eq!(s.max_label, Some(7));
    }
}
