//! Voxel coordinates and 6-connected neighborhoods

use std::fmt;

/// Offsets of the six face-adjacent neighbors: ±1 along one axis at a time.
///
/// Diagonal neighbors are never part of the neighborhood.
pub const FACE_OFFSETS: [(isize, isize, isize); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// A voxel coordinate `(i, j, k)`.
///
/// Ordering is lexicographic on `(i, j, k)`, which gives deterministic
/// iteration when voxels are kept in ordered sets or sorted vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Voxel {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl Voxel {
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// Apply an offset, returning `None` when the result leaves `dims`.
    pub fn offset(&self, delta: (isize, isize, isize), dims: (usize, usize, usize)) -> Option<Voxel> {
        let ni = self.i as isize + delta.0;
        let nj = self.j as isize + delta.1;
        let nk = self.k as isize + delta.2;
        if ni < 0
            || nj < 0
            || nk < 0
            || ni >= dims.0 as isize
            || nj >= dims.1 as isize
            || nk >= dims.2 as isize
        {
            return None;
        }
        Some(Voxel::new(ni as usize, nj as usize, nk as usize))
    }

    /// Squared Euclidean distance to another voxel
    pub fn distance_squared(&self, other: &Voxel) -> usize {
        let di = self.i.abs_diff(other.i);
        let dj = self.j.abs_diff(other.j);
        let dk = self.k.abs_diff(other.k);
        di * di + dj * dj + dk * dk
    }
}

impl From<(usize, usize, usize)> for Voxel {
    fn from((i, j, k): (usize, usize, usize)) -> Self {
        Voxel::new(i, j, k)
    }
}

impl fmt::Display for Voxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.i, self.j, self.k)
    }
}

/// Iterator over the in-bounds face neighbors of a voxel.
///
/// Neighbors that would fall outside the grid are skipped, so border
/// voxels yield fewer than six items.
pub struct FaceNeighbors {
    center: Voxel,
    dims: (usize, usize, usize),
    index: usize,
}

impl FaceNeighbors {
    pub fn new(center: Voxel, dims: (usize, usize, usize)) -> Self {
        Self {
            center,
            dims,
            index: 0,
        }
    }
}

impl Iterator for FaceNeighbors {
    type Item = Voxel;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < FACE_OFFSETS.len() {
            let delta = FACE_OFFSETS[self.index];
            self.index += 1;
            if let Some(v) = self.center.offset(delta, self.dims) {
                return Some(v);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(FACE_OFFSETS.len() - self.index))
    }
}
