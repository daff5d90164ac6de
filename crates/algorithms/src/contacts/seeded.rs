//! Seeded-growth contact detection
//!
//! Every grain is seeded at its centroid and grown breadth-first over the
//! union of all grain voxels. Where the fronts of two grains meet, a contact
//! is recorded with the growth step as strength. Grain regions that hold
//! no seed are closed to growth; they and any other voxels no front
//! reaches are resolved by the erosion level loop on the residual grid.

use super::accumulator::{ContactAccumulator, ContactPair};
use super::engine::{collect_contacts, run_levels, ContactParams, ContactReport, LogProgress, ProgressObserver};
use crate::regions::{centroids, regions_of, Centroid, CentroidParams};
use grainlink_core::voxel::{Voxel, VoxelGrid};
use grainlink_core::{Algorithm, Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Why a grain could not be seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFailureReason {
    /// The centroid carries a background or negative label
    InvalidLabel,
    /// No unclaimed foreground voxel lies within the search radius
    NoForegroundInRadius(usize),
}

/// A grain left out of seeded growth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedFailure {
    pub label: i32,
    pub centroid: Voxel,
    pub reason: SeedFailureReason,
}

impl fmt::Display for SeedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SeedFailureReason::InvalidLabel => {
                write!(f, "grain {} at {}: label is not a grain label", self.label, self.centroid)
            }
            SeedFailureReason::NoForegroundInRadius(r) => write!(
                f,
                "grain {} at {}: no free foreground voxel within radius {}",
                self.label, self.centroid, r
            ),
        }
    }
}

/// Parameters for seeded growth
#[derive(Debug, Clone)]
pub struct SeededParams {
    /// Level budget of the erosion fallback
    pub contact: ContactParams,
    /// How far from an off-shape centroid a seed voxel may be placed
    pub seed_search_radius: usize,
}

impl Default for SeededParams {
    fn default() -> Self {
        Self {
            contact: ContactParams::default(),
            seed_search_radius: 3,
        }
    }
}

/// Seeded-growth contact detection algorithm.
///
/// Input is `(labels, centroids)`; with `None` the centroids are computed
/// from the label grid.
#[derive(Debug, Clone, Default)]
pub struct SeededContacts;

impl Algorithm for SeededContacts {
    type Input = (VoxelGrid, Option<Vec<Centroid>>);
    type Output = ContactReport;
    type Params = SeededParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SeededContacts"
    }

    fn description(&self) -> &'static str {
        "Contact strengths from front collisions of grains grown from their centroids"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (labels, seeds) = input;
        let seeds = match seeds {
            Some(seeds) => seeds,
            None => centroids(&labels, &CentroidParams::default()),
        };
        seeded_contacts(&labels, &seeds, &params, &mut LogProgress)
    }
}

/// Ownership of every voxel during growth, 0 meaning unclaimed
struct Claims<'a> {
    labels: &'a VoxelGrid,
    owner: Vec<i32>,
    /// Voxels of unseeded regions, never claimed by growth
    closed: Vec<bool>,
}

impl<'a> Claims<'a> {
    fn new(labels: &'a VoxelGrid) -> Self {
        Self {
            labels,
            owner: vec![0; labels.len()],
            closed: vec![false; labels.len()],
        }
    }

    fn owner(&self, v: Voxel) -> i32 {
        self.owner[self.labels.flat_index(v.i, v.j, v.k)]
    }

    fn claim(&mut self, v: Voxel, label: i32) {
        let idx = self.labels.flat_index(v.i, v.j, v.k);
        self.owner[idx] = label;
    }

    fn is_free(&self, v: Voxel) -> bool {
        let idx = self.labels.flat_index(v.i, v.j, v.k);
        self.labels.at_voxel(v) != 0 && self.owner[idx] == 0 && !self.closed[idx]
    }

    /// Nearest free voxel within `radius` of `center` carrying `label`,
    /// else the nearest free foreground voxel of any label. Ties are broken
    /// by voxel order.
    fn nearest_free(&self, center: Voxel, radius: usize, label: i32) -> Option<Voxel> {
        let r = radius as isize;
        let mut own: Option<(usize, Voxel)> = None;
        let mut any: Option<(usize, Voxel)> = None;
        for di in -r..=r {
            for dj in -r..=r {
                for dk in -r..=r {
                    let Some(v) = center.offset((di, dj, dk), self.labels.dims()) else {
                        continue;
                    };
                    let d2 = v.distance_squared(&center);
                    if d2 > radius * radius || !self.is_free(v) {
                        continue;
                    }
                    let slot = if self.labels.at_voxel(v) == label {
                        &mut own
                    } else {
                        &mut any
                    };
                    if slot.map_or(true, |b| (d2, v) < b) {
                        *slot = Some((d2, v));
                    }
                }
            }
        }
        own.or(any).map(|(_, v)| v)
    }

    /// Close every grain region that holds no seed. Returns the number of
    /// regions closed.
    fn close_unseeded(&mut self) -> usize {
        let mut closed = 0;
        for region in regions_of(self.labels) {
            if region.voxels.iter().any(|v| self.owner(*v) != 0) {
                continue;
            }
            for v in &region.voxels {
                let idx = self.labels.flat_index(v.i, v.j, v.k);
                self.closed[idx] = true;
            }
            closed += 1;
        }
        closed
    }

    /// Pairs formed by `front` voxels and their differently owned neighbors
    fn collisions(&self, front: &[Voxel]) -> Vec<ContactPair> {
        let mut seen = BTreeSet::new();
        for &v in front {
            let own = self.owner(v);
            for n in self.labels.face_neighbors(v) {
                if let Some(pair) = ContactPair::new(own, self.owner(n)) {
                    seen.insert(pair);
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Claim the free neighbors of `front`; a voxel reached by several
    /// grains goes to the smallest label
    fn advance(&mut self, front: &[Voxel]) -> Vec<Voxel> {
        let mut reached: BTreeMap<Voxel, i32> = BTreeMap::new();
        for &v in front {
            let own = self.owner(v);
            for n in self.labels.face_neighbors(v) {
                if !self.is_free(n) {
                    continue;
                }
                reached
                    .entry(n)
                    .and_modify(|l| *l = (*l).min(own))
                    .or_insert(own);
            }
        }
        for (&v, &label) in &reached {
            self.claim(v, label);
        }
        reached.into_keys().collect()
    }

    fn unclaimed(&self) -> usize {
        self.labels
            .foreground_voxels()
            .filter(|(v, _)| self.owner(*v) == 0)
            .count()
    }

    /// Grown owner where claimed, original label elsewhere
    fn residual(&self) -> VoxelGrid {
        let mut grid = self.labels.clone();
        for (cell, &owner) in grid.data_mut().iter_mut().zip(&self.owner) {
            if owner != 0 {
                *cell = owner;
            }
        }
        grid
    }
}

fn record_all(
    contacts: &mut ContactAccumulator,
    pairs: Vec<ContactPair>,
    level: usize,
    observer: &mut dyn ProgressObserver,
) {
    let new_pairs = pairs
        .into_iter()
        .filter(|p| contacts.record_pair(*p, level))
        .count();
    observer.on_progress(level, new_pairs);
}

/// Detect grain contacts by growing every grain from a seed voxel.
///
/// Seeds are placed in `(label, i, j, k)` order, on the nearest free voxel
/// of the centroid's own label within `seed_search_radius` (the centroid
/// voxel itself when it qualifies). Only when no such voxel exists is the
/// nearest free voxel of another grain used. Grains that cannot be seeded
/// are listed in [`ContactReport::seed_failures`].
///
/// Grain regions left without a seed are closed to growth, so their
/// neighbors cannot absorb them. Seeds form growth level 1; each further
/// step claims the free neighbors of the previous front. Newly claimed voxels touching a voxel of another
/// grain record that pair at the current growth level. If foreground voxels
/// remain unclaimed afterwards, the residual grid goes through the erosion
/// level loop, starting at the level after the last growth step.
///
/// # Errors
/// `EmptyGrid` or `InvalidParameter`.
pub fn seeded_contacts(
    labels: &VoxelGrid,
    seeds: &[Centroid],
    params: &SeededParams,
    observer: &mut dyn ProgressObserver,
) -> Result<ContactReport> {
    labels.ensure_not_empty()?;
    params.contact.validate()?;

    let mut ordered: Vec<Centroid> = seeds.to_vec();
    ordered.sort_by_key(|c| (c.label, c.voxel));

    let mut claims = Claims::new(labels);
    let mut front = Vec::with_capacity(ordered.len());
    let mut seed_failures = Vec::new();

    for c in &ordered {
        let placed = if c.label <= 0 {
            Err(SeedFailureReason::InvalidLabel)
        } else {
            claims
                .nearest_free(c.voxel, params.seed_search_radius, c.label)
                .ok_or(SeedFailureReason::NoForegroundInRadius(params.seed_search_radius))
        };
        match placed {
            Ok(v) => {
                if v != c.voxel {
                    debug!(label = c.label, centroid = %c.voxel, seed = %v, "centroid moved onto grain");
                }
                claims.claim(v, c.label);
                front.push(v);
            }
            Err(reason) => {
                let failure = SeedFailure {
                    label: c.label,
                    centroid: c.voxel,
                    reason,
                };
                warn!("seed not placed: {}", failure);
                seed_failures.push(failure);
            }
        }
    }
    front.sort();
    let closed = claims.close_unseeded();
    if closed > 0 {
        debug!(closed, "unseeded regions left for the erosion fallback");
    }

    let mut contacts = ContactAccumulator::new();
    let mut level = 0;
    while !front.is_empty() {
        level += 1;
        if level > 1 {
            front = claims.advance(&front);
            if front.is_empty() {
                level -= 1;
                break;
            }
        }
        record_all(&mut contacts, claims.collisions(&front), level, observer);
    }
    let growth_levels = level;

    let unclaimed = claims.unclaimed();
    info!(
        seeds = ordered.len() - seed_failures.len(),
        growth_levels,
        contacts = contacts.len(),
        unclaimed,
        "seeded growth finished"
    );

    let mut report = ContactReport {
        last_level: growth_levels,
        converged: true,
        growth_levels,
        seed_failures,
        ..Default::default()
    };

    if unclaimed > 0 {
        let residual = claims.residual();
        let budget = params.contact.level_budget(&residual);
        let outcome = run_levels(
            residual.clone(),
            growth_levels + 1,
            growth_levels + budget,
            &mut contacts,
            observer,
            |current| collect_contacts(&residual, |v| current.at_voxel(v) != 0),
        );
        info!(
            contacts = contacts.len(),
            levels = outcome.last_level,
            converged = outcome.converged,
            "erosion fallback finished"
        );
        report.last_level = outcome.last_level;
        report.converged = outcome.converged;
        report.fallback_used = true;
    }

    report.contacts = contacts;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::NoProgress;

    /// Two 3x3x3 cubes along i, labels 1 and 2
    fn two_cubes() -> VoxelGrid {
        let mut grid = VoxelGrid::new(6, 3, 3);
        for i in 0..6 {
            for j in 0..3 {
                for k in 0..3 {
                    grid.set(i, j, k, if i < 3 { 1 } else { 2 }).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn test_fronts_meet_at_second_step() {
        let grid = two_cubes();
        let report = SeededContacts.execute_default((grid, None)).unwrap();
        assert_eq!(report.contacts.len(), 1);
        // Seeds at i = 1 and i = 4 reach i = 2 and i = 3 in one step
        assert_eq!(report.contacts.strength(1, 2), Some(2));
        assert!(!report.fallback_used);
        assert!(report.seed_failures.is_empty());
        assert!(report.converged);
    }

    #[test]
    fn test_adjacent_seeds_collide_at_level_one() {
        let grid = VoxelGrid::from_vec(vec![1, 2], 1, 1, 2).unwrap();
        let seeds = vec![
            Centroid::new(Voxel::new(0, 0, 0), 1),
            Centroid::new(Voxel::new(0, 0, 1), 2),
        ];
        let report =
            seeded_contacts(&grid, &seeds, &SeededParams::default(), &mut NoProgress).unwrap();
        assert_eq!(report.contacts.strength(1, 2), Some(1));
        assert_eq!(report.growth_levels, 1);
    }

    #[test]
    fn test_off_shape_centroid_moves_to_nearest_voxel() {
        // Label 1 occupies k = 0 and k = 4, centroid at k = 2 is background
        let grid = VoxelGrid::from_vec(vec![1, 0, 0, 0, 1, 2], 1, 1, 6).unwrap();
        let claims = Claims::new(&grid);
        assert_eq!(claims.nearest_free(Voxel::new(0, 0, 2), 3, 1), Some(Voxel::new(0, 0, 0)));
        assert_eq!(claims.nearest_free(Voxel::new(0, 0, 2), 1, 1), None);
    }

    #[test]
    fn test_seed_prefers_own_grain() {
        // Centroid of label 1 lands on label 2
        let grid = VoxelGrid::from_vec(vec![1, 1, 2, 2, 2], 1, 1, 5).unwrap();
        let claims = Claims::new(&grid);
        assert_eq!(claims.nearest_free(Voxel::new(0, 0, 2), 3, 1), Some(Voxel::new(0, 0, 1)));
        // No voxel of label 7 nearby: any grain voxel will do
        assert_eq!(claims.nearest_free(Voxel::new(0, 0, 2), 3, 7), Some(Voxel::new(0, 0, 2)));
    }

    #[test]
    fn test_unseeded_middle_grain_is_not_absorbed() {
        let grid = VoxelGrid::from_vec(vec![1, 1, 1, 2, 2, 2, 3, 3, 3], 1, 1, 9).unwrap();
        let seeds = vec![
            Centroid::new(Voxel::new(0, 0, 1), 1),
            // Outside the grid, cannot be placed
            Centroid::new(Voxel::new(0, 5, 4), 2),
            Centroid::new(Voxel::new(0, 0, 7), 3),
        ];
        let params = SeededParams {
            seed_search_radius: 1,
            ..Default::default()
        };
        let report = seeded_contacts(&grid, &seeds, &params, &mut NoProgress).unwrap();
        assert_eq!(report.seed_failures.len(), 1);
        assert_eq!(report.seed_failures[0].label, 2);
        assert!(report.fallback_used);
        assert_eq!(report.growth_levels, 2);
        assert_eq!(report.contacts.strength(1, 2), Some(3));
        assert_eq!(report.contacts.strength(2, 3), Some(3));
        assert_eq!(report.contacts.strength(1, 3), None);
        assert_eq!(report.contacts.len(), 2);
    }

    #[test]
    fn test_seed_failure_is_reported_and_fallback_runs() {
        // Grains 1 and 2 touch; only grain 3, far away, gets a usable seed
        let grid = VoxelGrid::from_vec(vec![1, 2, 0, 0, 0, 3], 1, 1, 6).unwrap();
        let seeds = vec![
            Centroid::new(Voxel::new(0, 0, 3), 1),
            Centroid::new(Voxel::new(0, 0, 3), 2),
            Centroid::new(Voxel::new(0, 0, 5), 3),
        ];
        let params = SeededParams {
            seed_search_radius: 0,
            ..Default::default()
        };
        let report = seeded_contacts(&grid, &seeds, &params, &mut NoProgress).unwrap();
        assert_eq!(report.seed_failures.len(), 2);
        assert_eq!(report.seed_failures[0].label, 1);
        assert_eq!(
            report.seed_failures[0].reason,
            SeedFailureReason::NoForegroundInRadius(0)
        );
        assert!(report.fallback_used);
        assert_eq!(report.growth_levels, 1);
        assert_eq!(report.contacts.strength(1, 2), Some(2));
        assert!(report.converged);
    }

    #[test]
    fn test_contested_voxel_goes_to_smaller_label() {
        // Seeds at k = 0 (label 5) and k = 2 (label 3) both reach k = 1
        let grid = VoxelGrid::filled(1, 1, 3, 9);
        let seeds = vec![
            Centroid::new(Voxel::new(0, 0, 0), 5),
            Centroid::new(Voxel::new(0, 0, 2), 3),
        ];
        let mut claims = Claims::new(&grid);
        claims.claim(seeds[0].voxel, 5);
        claims.claim(seeds[1].voxel, 3);
        let front = claims.advance(&[seeds[1].voxel, seeds[0].voxel]);
        assert_eq!(front, vec![Voxel::new(0, 0, 1)]);
        assert_eq!(claims.owner(Voxel::new(0, 0, 1)), 3);

        let report =
            seeded_contacts(&grid, &seeds, &SeededParams::default(), &mut NoProgress).unwrap();
        assert_eq!(report.contacts.strength(3, 5), Some(2));
    }

    #[test]
    fn test_invalid_label_is_a_seed_failure() {
        let grid = VoxelGrid::filled(1, 1, 2, 1);
        let seeds = vec![Centroid::new(Voxel::new(0, 0, 0), 0)];
        let report =
            seeded_contacts(&grid, &seeds, &SeededParams::default(), &mut NoProgress).unwrap();
        assert_eq!(report.seed_failures[0].reason, SeedFailureReason::InvalidLabel);
        assert!(report.fallback_used);
        assert!(report.contacts.is_empty());
    }
}
