//! Connected regions of voxel grids
//!
//! - **Components**: 6-connected component labeling of a binary mask
//! - **Centroids**: one representative voxel per grain, used as growth
//!   seeds and as grain positions in the adjacency graph

mod centroid;
mod components;

pub use centroid::{centroids, Centroid, CentroidParams, Centroids};
pub use components::{label_components, regions_of, Region};
