//! Grain contact detection
//!
//! Three detectors share one contract: they return a [`ContactReport`]
//! whose accumulator maps every contact pair to the level at which it was
//! first seen.
//!
//! - [`naive_contacts`]: scans every voxel at every erosion level
//! - [`skeleton_contacts`]: scans only the voxels of a skeleton mask
//! - [`seeded_contacts`]: grows grains from their centroids, then erodes
//!   whatever growth did not reach

mod accumulator;
mod engine;
mod naive;
mod providers;
mod seeded;
mod skeleton;

pub use accumulator::{ContactAccumulator, ContactPair};
pub use engine::{ContactParams, ContactReport, LogProgress, NoProgress, ProgressObserver};
pub use naive::{naive_contacts, NaiveContacts};
pub use providers::{
    ComponentSegmentation, InterfaceSkeleton, PrecomputedLabels, PrecomputedSkeleton,
    SegmentationProvider, SkeletonProvider,
};
pub use seeded::{seeded_contacts, SeedFailure, SeedFailureReason, SeededContacts, SeededParams};
pub use skeleton::{skeleton_contacts, skeleton_contacts_from, SkeletonContacts};
