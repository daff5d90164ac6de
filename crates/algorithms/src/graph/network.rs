//! Grain adjacency graph
//!
//! Grains live in an arena and refer to their neighbors by index. The
//! symmetry of neighbor lists is enforced in [`GrainGraph::connect`], the
//! only place links are added.

use crate::contacts::ContactAccumulator;
use crate::regions::Centroid;
use grainlink_core::io::{PairRecord, PositionRecord};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Index of a grain in its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GrainId(pub usize);

/// One grain: label, position and the grains it touches
#[derive(Debug, Clone, PartialEq)]
pub struct Grain {
    pub label: i32,
    /// `[x, y, z]`
    pub position: [f64; 3],
    neighbors: Vec<GrainId>,
}

impl Grain {
    pub fn neighbors(&self) -> &[GrainId] {
        &self.neighbors
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }
}

/// Outcome of [`GrainGraph::load_contacts`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactLoadReport {
    /// Links added
    pub added: usize,
    /// Pairs that were already linked
    pub duplicates: usize,
    /// Records skipped for an unknown label or a self pair
    pub skipped: Vec<PairRecord>,
}

/// Grain labels split by whether they have any neighbor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub connected: Vec<i32>,
    pub unconnected: Vec<i32>,
}

/// Label → grain map with symmetric neighbor links
#[derive(Debug, Clone, Default)]
pub struct GrainGraph {
    grains: Vec<Grain>,
    index: HashMap<i32, GrainId>,
}

impl GrainGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from detector output: one grain per centroid label,
    /// one link per recorded contact.
    ///
    /// When a label has several centroids (split grain) the last one wins.
    pub fn from_contacts(centroids: &[Centroid], contacts: &ContactAccumulator) -> Self {
        let mut graph = Self::new();
        graph.load_positions(centroids.iter().map(|c| PositionRecord {
            label: c.label,
            x: c.voxel.i as f64,
            y: c.voxel.j as f64,
            z: c.voxel.k as f64,
        }));
        graph.load_contacts(contacts.iter().map(|(pair, _)| PairRecord {
            label1: pair.low(),
            label2: pair.high(),
        }));
        graph
    }

    /// Add or update grains from position records.
    ///
    /// A label seen again overwrites the stored position; neighbor links of
    /// the existing grain are kept.
    pub fn load_positions<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = PositionRecord>,
    {
        for r in records {
            let position = [r.x, r.y, r.z];
            match self.index.get(&r.label) {
                Some(&id) => {
                    debug!(label = r.label, "position overwritten");
                    self.grains[id.0].position = position;
                }
                None => {
                    let id = GrainId(self.grains.len());
                    self.grains.push(Grain {
                        label: r.label,
                        position,
                        neighbors: Vec::new(),
                    });
                    self.index.insert(r.label, id);
                }
            }
        }
    }

    /// Link grains from contact records.
    ///
    /// A record naming an unknown label, or the same label twice, is
    /// skipped with a warning and loading continues.
    pub fn load_contacts<I>(&mut self, records: I) -> ContactLoadReport
    where
        I: IntoIterator<Item = PairRecord>,
    {
        let mut report = ContactLoadReport::default();
        for r in records {
            let ids = (self.id_of(r.label1), self.id_of(r.label2));
            let (a, b) = match ids {
                (Some(a), Some(b)) if a != b => (a, b),
                (Some(_), Some(_)) => {
                    warn!(label = r.label1, "skipping self contact");
                    report.skipped.push(r);
                    continue;
                }
                _ => {
                    let missing = if ids.0.is_none() { r.label1 } else { r.label2 };
                    warn!(
                        label1 = r.label1,
                        label2 = r.label2,
                        missing,
                        "skipping contact with unknown grain"
                    );
                    report.skipped.push(r);
                    continue;
                }
            };
            if self.connect(a, b) {
                report.added += 1;
            } else {
                report.duplicates += 1;
            }
        }
        debug!(
            added = report.added,
            duplicates = report.duplicates,
            skipped = report.skipped.len(),
            "contacts loaded"
        );
        report
    }

    /// Link two grains in both directions. Returns `false` if they were
    /// already linked, if `a == b`, or if either id is not in the arena.
    pub fn connect(&mut self, a: GrainId, b: GrainId) -> bool {
        let n = self.grains.len();
        if a == b || a.0 >= n || b.0 >= n || self.grains[a.0].neighbors.contains(&b) {
            return false;
        }
        self.grains[a.0].neighbors.push(b);
        self.grains[b.0].neighbors.push(a);
        true
    }

    pub fn lookup(&self, label: i32) -> Option<&Grain> {
        self.id_of(label).map(|id| &self.grains[id.0])
    }

    pub fn id_of(&self, label: i32) -> Option<GrainId> {
        self.index.get(&label).copied()
    }

    /// Grain by arena index
    pub fn grain(&self, id: GrainId) -> Option<&Grain> {
        self.grains.get(id.0)
    }

    /// Neighbors of a grain; empty for an id outside the arena
    pub fn neighbors(&self, id: GrainId) -> impl Iterator<Item = &Grain> + '_ {
        self.grain(id)
            .map(|g| g.neighbors.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |n| &self.grains[n.0])
    }

    pub fn neighbor_count(&self, id: GrainId) -> usize {
        self.grain(id).map_or(0, Grain::neighbor_count)
    }

    /// Label → number of neighbors, sorted by label
    pub fn neighbor_counts(&self) -> Vec<(i32, usize)> {
        let mut counts: Vec<(i32, usize)> = self
            .grains
            .iter()
            .map(|g| (g.label, g.neighbor_count()))
            .collect();
        counts.sort_unstable();
        counts
    }

    /// Every link once, as `(low, high)` label pairs
    pub fn edges(&self) -> BTreeSet<(i32, i32)> {
        self.grains
            .iter()
            .flat_map(|g| {
                g.neighbors.iter().map(move |n| {
                    let other = self.grains[n.0].label;
                    (g.label.min(other), g.label.max(other))
                })
            })
            .collect()
    }

    pub fn connectivity_partition(&self) -> Partition {
        let mut partition = Partition::default();
        for g in &self.grains {
            if g.neighbors.is_empty() {
                partition.unconnected.push(g.label);
            } else {
                partition.connected.push(g.label);
            }
        }
        partition.connected.sort_unstable();
        partition.unconnected.sort_unstable();
        partition
    }

    /// Grains in arena (insertion) order
    pub fn grains(&self) -> impl Iterator<Item = &Grain> + '_ {
        self.grains.iter()
    }

    pub fn len(&self) -> usize {
        self.grains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grains.is_empty()
    }
}
