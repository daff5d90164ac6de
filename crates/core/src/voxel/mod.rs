//! Voxel grid data structures and neighborhood helpers

mod grid;
mod neighborhood;

pub use grid::{GridSummary, VoxelGrid};
pub use neighborhood::{FaceNeighbors, Voxel, FACE_OFFSETS};
