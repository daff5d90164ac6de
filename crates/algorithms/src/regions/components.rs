//! 6-connected component labeling

use grainlink_core::voxel::{Voxel, VoxelGrid};
use std::collections::VecDeque;

/// One connected region of equal-valued foreground voxels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Value shared by every voxel of the region
    pub value: i32,
    /// Voxels in breadth-first discovery order
    pub voxels: Vec<Voxel>,
}

/// Label the 6-connected components of a binary mask.
///
/// Every non-zero voxel is foreground regardless of its value. Components
/// are numbered 1, 2, ... in the order their first voxel is met in index
/// order. Returns the label grid and the number of components.
pub fn label_components(mask: &VoxelGrid) -> (VoxelGrid, usize) {
    let mut labels = mask.like();
    let mut count = 0usize;

    for (seed, _) in mask.foreground_voxels() {
        if labels.at_voxel(seed) != 0 {
            continue;
        }
        count += 1;
        let id = count as i32;
        flood(mask, seed, |_| true, |v| {
            let cell = &mut labels.data_mut()[(v.i, v.j, v.k)];
            if *cell == 0 {
                *cell = id;
                true
            } else {
                false
            }
        });
    }

    (labels, count)
}

/// Split a label grid into connected regions of equal positive value.
///
/// A label whose voxels form several disconnected pieces yields one region
/// per piece. Regions appear in the index order of their first voxel.
pub fn regions_of(labels: &VoxelGrid) -> Vec<Region> {
    let mut visited = vec![false; labels.len()];
    let mut regions = Vec::new();

    for (seed, value) in labels.foreground_voxels() {
        if value <= 0 || visited[labels.flat_index(seed.i, seed.j, seed.k)] {
            continue;
        }
        let mut voxels = Vec::new();
        flood(labels, seed, |n| labels.at_voxel(n) == value, |v| {
            let idx = labels.flat_index(v.i, v.j, v.k);
            if visited[idx] {
                return false;
            }
            visited[idx] = true;
            voxels.push(v);
            true
        });
        regions.push(Region { value, voxels });
    }

    regions
}

/// Breadth-first flood from `seed` over foreground voxels.
///
/// `accept` filters neighbors before they are claimed; `claim` marks a
/// voxel and returns `false` if it was already taken.
fn flood<A, C>(grid: &VoxelGrid, seed: Voxel, accept: A, mut claim: C)
where
    A: Fn(Voxel) -> bool,
    C: FnMut(Voxel) -> bool,
{
    if !claim(seed) {
        return;
    }
    let mut queue = VecDeque::from([seed]);
    while let Some(v) = queue.pop_front() {
        for n in grid.face_neighbors(v) {
            if grid.at_voxel(n) == 0 || !accept(n) {
                continue;
            }
            if claim(n) {
                queue.push_back(n);
            }
        }
    }
}
