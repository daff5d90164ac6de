//! # grainlink Algorithms
//!
//! Grain contact analysis on labeled voxel volumes.
//!
//! ## Available Algorithm Categories
//!
//! - **morphology**: 6-connected erosion
//! - **regions**: Connected components, grain centroids
//! - **contacts**: Naive, skeleton-guided and seeded-growth contact detection
//! - **graph**: Grain adjacency networks, edge and position comparison

pub(crate) mod maybe_rayon;

pub mod contacts;
pub mod graph;
pub mod morphology;
pub mod regions;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::contacts::{
        naive_contacts, seeded_contacts, skeleton_contacts, skeleton_contacts_from,
        ContactAccumulator, ContactPair, ContactParams, ContactReport, LogProgress,
        NaiveContacts, NoProgress, ProgressObserver, SeededContacts, SeededParams,
        SkeletonContacts, SkeletonProvider,
    };
    pub use crate::graph::{
        compare_edges, compare_positions, track_edges, EdgeDiff, GrainGraph, Partition,
        PositionDiff,
    };
    pub use crate::morphology::{erode, erode_steps, Erode, ErodeParams};
    pub use crate::regions::{centroids, label_components, Centroid, CentroidParams, Centroids};
    pub use grainlink_core::prelude::*;
}
