//! Skeleton-guided contact detection
//!
//! Same level loop as the naive detector, but each scan only visits the
//! voxels of a precomputed skeleton mask. Skeleton voxels sit on the medial
//! surfaces of the packing and persist near contact zones through many
//! erosion levels, so the scan cost drops from the whole volume to the
//! skeleton size.

use super::accumulator::ContactAccumulator;
use super::engine::{collect_contacts, run_levels, ContactParams, ContactReport, LogProgress, ProgressObserver};
use super::providers::SkeletonProvider;
use grainlink_core::voxel::VoxelGrid;
use grainlink_core::{Algorithm, Error, Result};
use tracing::info;

/// Skeleton-guided contact detection algorithm.
///
/// Input is `(labels, skeleton)`.
#[derive(Debug, Clone, Default)]
pub struct SkeletonContacts;

impl Algorithm for SkeletonContacts {
    type Input = (VoxelGrid, VoxelGrid);
    type Output = ContactReport;
    type Params = ContactParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SkeletonContacts"
    }

    fn description(&self) -> &'static str {
        "Contact strengths from iterative erosion, scanning skeleton voxels only"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (labels, skeleton) = input;
        skeleton_contacts(&labels, &skeleton, &params, &mut LogProgress)
    }
}

/// Detect grain contacts by scanning only skeleton voxels.
///
/// A voxel is scanned when it is non-zero in `skeleton` and still
/// foreground in the current eroded grid. Its neighbors are read from the
/// current grid. When the skeleton covers every inter-grain boundary, the
/// result equals [`naive_contacts`](super::naive_contacts).
///
/// # Errors
/// `DimensionMismatch` when the grids differ in shape (checked before any
/// scan), `EmptyGrid`, or `InvalidParameter`.
pub fn skeleton_contacts(
    labels: &VoxelGrid,
    skeleton: &VoxelGrid,
    params: &ContactParams,
    observer: &mut dyn ProgressObserver,
) -> Result<ContactReport> {
    labels.ensure_not_empty()?;
    labels.ensure_same_dims(skeleton)?;
    params.validate()?;

    let skeleton_voxels = skeleton.foreground_count();
    info!(
        skeleton_voxels,
        total_voxels = labels.len(),
        "scanning skeleton voxels only"
    );

    let mut contacts = ContactAccumulator::new();
    let outcome = run_levels(
        labels.clone(),
        1,
        params.level_budget(labels),
        &mut contacts,
        observer,
        |current| {
            collect_contacts(current, |v| {
                skeleton.at_voxel(v) != 0 && current.at_voxel(v) != 0
            })
        },
    );

    info!(
        contacts = contacts.len(),
        levels = outcome.last_level,
        converged = outcome.converged,
        "skeleton contact detection finished"
    );

    Ok(ContactReport {
        contacts,
        last_level: outcome.last_level,
        converged: outcome.converged,
        ..Default::default()
    })
}

/// Run [`skeleton_contacts`] with a mask obtained from a provider
pub fn skeleton_contacts_from(
    labels: &VoxelGrid,
    provider: &dyn SkeletonProvider,
    params: &ContactParams,
    observer: &mut dyn ProgressObserver,
) -> Result<ContactReport> {
    let skeleton = provider.skeleton(labels)?;
    skeleton_contacts(labels, &skeleton, params, observer)
}
