//! Ports to the external tools that prepare detector inputs.
//!
//! Segmentation (min/max-tree labeling) and skeletonization are done by
//! external programs; the detectors only see their output grids through
//! these traits.

use crate::regions::label_components;
use grainlink_core::voxel::VoxelGrid;
use grainlink_core::Result;
use std::borrow::Cow;

/// Supplies the skeleton mask used by the skeleton-guided detector.
///
/// Non-zero voxels of the returned grid are scanned; the grid must have the
/// same dimensions as the label grid.
pub trait SkeletonProvider {
    fn skeleton<'a>(&'a self, labels: &VoxelGrid) -> Result<Cow<'a, VoxelGrid>>;
}

/// Supplies a labeled grid (0 = background, positive = grain label).
pub trait SegmentationProvider {
    fn labels(&self) -> Result<Cow<'_, VoxelGrid>>;
}

/// A skeleton mask computed ahead of time and loaded from disk
#[derive(Debug, Clone)]
pub struct PrecomputedSkeleton {
    mask: VoxelGrid,
}

impl PrecomputedSkeleton {
    pub fn new(mask: VoxelGrid) -> Self {
        Self { mask }
    }
}

impl SkeletonProvider for PrecomputedSkeleton {
    fn skeleton<'a>(&'a self, labels: &VoxelGrid) -> Result<Cow<'a, VoxelGrid>> {
        labels.ensure_same_dims(&self.mask)?;
        Ok(Cow::Borrowed(&self.mask))
    }
}

/// Marks every foreground voxel that touches a different positive label.
///
/// The result covers every grain-grain interface of the input, so the
/// skeleton-guided detector run with it agrees with the naive detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceSkeleton;

impl SkeletonProvider for InterfaceSkeleton {
    fn skeleton<'a>(&'a self, labels: &VoxelGrid) -> Result<Cow<'a, VoxelGrid>> {
        let mut mask = labels.like();
        for (v, label) in labels.foreground_voxels() {
            if label <= 0 {
                continue;
            }
            let on_interface = labels.face_neighbors(v).any(|n| {
                let other = labels.at_voxel(n);
                other > 0 && other != label
            });
            if on_interface {
                mask.data_mut()[(v.i, v.j, v.k)] = 1;
            }
        }
        Ok(Cow::Owned(mask))
    }
}

/// A label grid produced by an external segmentation run
#[derive(Debug, Clone)]
pub struct PrecomputedLabels {
    labels: VoxelGrid,
}

impl PrecomputedLabels {
    pub fn new(labels: VoxelGrid) -> Self {
        Self { labels }
    }
}

impl SegmentationProvider for PrecomputedLabels {
    fn labels(&self) -> Result<Cow<'_, VoxelGrid>> {
        Ok(Cow::Borrowed(&self.labels))
    }
}

/// Labels the connected components of a binary mask (e.g. a thresholded
/// min-tree image), numbering them 1, 2, ... in scan order
#[derive(Debug, Clone)]
pub struct ComponentSegmentation {
    mask: VoxelGrid,
}

impl ComponentSegmentation {
    pub fn new(mask: VoxelGrid) -> Self {
        Self { mask }
    }
}

impl SegmentationProvider for ComponentSegmentation {
    fn labels(&self) -> Result<Cow<'_, VoxelGrid>> {
        self.mask.ensure_not_empty()?;
        let (labels, _) = label_components(&self.mask);
        Ok(Cow::Owned(labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grainlink_core::Error;

    #[test]
    fn test_precomputed_skeleton_checks_dims() {
        let provider = PrecomputedSkeleton::new(VoxelGrid::new(2, 2, 2));
        assert!(provider.skeleton(&VoxelGrid::new(2, 2, 2)).is_ok());
        assert!(matches!(
            provider.skeleton(&VoxelGrid::new(2, 2, 3)),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_interface_skeleton_marks_both_sides() {
        let labels = VoxelGrid::from_vec(vec![1, 1, 2, 2, 0, 3], 1, 1, 6).unwrap();
        let mask = InterfaceSkeleton.skeleton(&labels).unwrap();
        let marked: Vec<i32> = (0..6).map(|k| mask.at(0, 0, k)).collect();
        assert_eq!(marked, vec![0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_component_segmentation() {
        let mask = VoxelGrid::from_vec(vec![1, 1, 0, 1], 1, 1, 4).unwrap();
        let segmentation = ComponentSegmentation::new(mask);
        let labels = segmentation.labels().unwrap();
        assert_eq!(labels.as_slice().unwrap(), &[1, 1, 0, 2]);
    }
}
