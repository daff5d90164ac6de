//! Level loop shared by all contact detectors
//!
//! ```text
//! Scanning(level) --new pairs--> Eroding --> Scanning(level + 1)
//!        |
//!        +--no new pair--> Terminal
//! ```
//!
//! Levels are 1-based: pairs found by the first scan get strength 1.

use super::accumulator::{ContactAccumulator, ContactPair};
use super::seeded::SeedFailure;
use crate::maybe_rayon::*;
use crate::morphology::erode;
use grainlink_core::voxel::{Voxel, VoxelGrid};
use grainlink_core::{Error, Result};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Parameters shared by the erosion-based contact detectors
#[derive(Debug, Clone, Default)]
pub struct ContactParams {
    /// Highest level the loop may scan before giving up.
    /// `None` uses the largest grid dimension plus one, which no grain can
    /// outlast under erosion.
    pub max_levels: Option<usize>,
}

impl ContactParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_levels == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_levels",
                value: "0".to_string(),
                reason: "at least one scan level is required".to_string(),
            });
        }
        Ok(())
    }

    /// Number of levels the loop may scan for this grid
    pub fn level_budget(&self, grid: &VoxelGrid) -> usize {
        self.max_levels.unwrap_or(grid.max_dim() + 1)
    }
}

/// Result of a contact detector run
#[derive(Debug, Clone, Default)]
pub struct ContactReport {
    /// Pair → strength of first detection
    pub contacts: ContactAccumulator,
    /// Last level that was scanned (0 if nothing was scanned)
    pub last_level: usize,
    /// `false` when the level budget ran out while new pairs were still
    /// being found; `contacts` then holds a valid partial result
    pub converged: bool,
    /// Number of growth levels used by seeded growth (0 for the other detectors)
    pub growth_levels: usize,
    /// Whether seeded growth had to run the erosion fallback
    pub fallback_used: bool,
    /// Grains that seeded growth could not seed
    pub seed_failures: Vec<SeedFailure>,
}

/// Receives progress updates from the level loop
pub trait ProgressObserver {
    /// Called after each scan with the level and the number of new pairs
    fn on_progress(&mut self, level: usize, new_pairs: usize);
}

/// Observer that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _level: usize, _new_pairs: usize) {}
}

/// Observer that forwards updates to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, level: usize, new_pairs: usize) {
        debug!(level, new_pairs, "contact scan");
    }
}

/// How the level loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoopOutcome {
    pub last_level: usize,
    pub converged: bool,
}

/// Run the scan/erode loop until a scan finds no new pair.
///
/// `scan` returns the pairs visible in the current grid; they are sorted
/// and deduplicated before being recorded, so the voxel visiting order has
/// no effect on the result. `last_allowed` is the highest level that may
/// be scanned.
pub(crate) fn run_levels<S>(
    start: VoxelGrid,
    first_level: usize,
    last_allowed: usize,
    contacts: &mut ContactAccumulator,
    observer: &mut dyn ProgressObserver,
    scan: S,
) -> LoopOutcome
where
    S: Fn(&VoxelGrid) -> Vec<ContactPair>,
{
    let mut current = start;
    let mut level = first_level;

    loop {
        let found = scan(&current);
        let new_pairs = found
            .into_iter()
            .filter(|pair| contacts.record_pair(*pair, level))
            .count();
        observer.on_progress(level, new_pairs);

        if new_pairs == 0 {
            debug!(level, total = contacts.len(), "no new contacts, stopping");
            return LoopOutcome {
                last_level: level,
                converged: true,
            };
        }

        if level >= last_allowed {
            warn!(
                level,
                total = contacts.len(),
                "level budget exhausted while contacts were still appearing; keeping partial result"
            );
            return LoopOutcome {
                last_level: level,
                converged: false,
            };
        }

        current = erode(&current);
        level += 1;
    }
}

/// Collect the contact pairs seen from every voxel for which `active` holds.
///
/// The label of an active voxel and of its in-bounds face neighbors are
/// read from `labels`. Work is split per `i` slab; the merged result is
/// sorted and free of duplicates.
pub(crate) fn collect_contacts<F>(labels: &VoxelGrid, active: F) -> Vec<ContactPair>
where
    F: Fn(Voxel) -> bool + Sync + Send,
{
    let (x_dim, y_dim, z_dim) = labels.dims();

    let per_slab: Vec<Vec<ContactPair>> = (0..x_dim)
        .into_par_iter()
        .map(|i| {
            let mut seen = BTreeSet::new();
            for j in 0..y_dim {
                for k in 0..z_dim {
                    let v = Voxel::new(i, j, k);
                    if !active(v) {
                        continue;
                    }
                    let label = labels.at_voxel(v);
                    for n in labels.face_neighbors(v) {
                        if let Some(pair) = ContactPair::new(label, labels.at_voxel(n)) {
                            seen.insert(pair);
                        }
                    }
                }
            }
            seen.into_iter().collect()
        })
        .collect();

    let merged: BTreeSet<ContactPair> = per_slab.into_iter().flatten().collect();
    merged.into_iter().collect()
}
