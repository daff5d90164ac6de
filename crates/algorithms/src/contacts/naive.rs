//! Naive contact detection
//!
//! Scans every voxel at every level. Slow, but it is the reference the
//! optimized detectors are checked against.

use super::engine::{collect_contacts, run_levels, ContactParams, ContactReport, LogProgress, ProgressObserver};
use super::accumulator::ContactAccumulator;
use grainlink_core::voxel::VoxelGrid;
use grainlink_core::{Algorithm, Error, Result};
use tracing::info;

/// Naive contact detection algorithm
#[derive(Debug, Clone, Default)]
pub struct NaiveContacts;

impl Algorithm for NaiveContacts {
    type Input = VoxelGrid;
    type Output = ContactReport;
    type Params = ContactParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "NaiveContacts"
    }

    fn description(&self) -> &'static str {
        "Contact strengths from iterative erosion, scanning every voxel"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        naive_contacts(&input, &params, &mut LogProgress)
    }
}

/// Detect grain contacts by scanning the whole grid at every erosion level.
///
/// At each level every foreground voxel of the current (eroded) grid is
/// visited, but its label and its neighbors' labels are read from the
/// original grid. A neighbor eroded earlier in the same pass therefore
/// still counts as a contact.
///
/// # Errors
/// `EmptyGrid` for a grid without voxels, `InvalidParameter` for a zero
/// level budget.
pub fn naive_contacts(
    labels: &VoxelGrid,
    params: &ContactParams,
    observer: &mut dyn ProgressObserver,
) -> Result<ContactReport> {
    labels.ensure_not_empty()?;
    params.validate()?;

    let mut contacts = ContactAccumulator::new();
    let outcome = run_levels(
        labels.clone(),
        1,
        params.level_budget(labels),
        &mut contacts,
        observer,
        |current| collect_contacts(labels, |v| current.at_voxel(v) != 0),
    );

    info!(
        contacts = contacts.len(),
        levels = outcome.last_level,
        converged = outcome.converged,
        "naive contact detection finished"
    );

    Ok(ContactReport {
        contacts,
        last_level: outcome.last_level,
        converged: outcome.converged,
        ..Default::default()
    })
}
