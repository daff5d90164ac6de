//! Comparison of grain networks across frames

use super::network::GrainGraph;
use std::collections::{BTreeSet, HashMap};

/// Edge-set changes between two frames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDiff {
    /// Edges of the current frame absent from the previous one
    pub new: BTreeSet<(i32, i32)>,
    /// Edges present in both frames
    pub persisting: BTreeSet<(i32, i32)>,
    /// Edges of the previous frame absent from the current one
    pub vanished: BTreeSet<(i32, i32)>,
}

/// Classify the edges of `current` against `previous`.
///
/// Without a previous frame every edge is new.
pub fn compare_edges(current: &GrainGraph, previous: Option<&GrainGraph>) -> EdgeDiff {
    let now = current.edges();
    let before = previous.map(GrainGraph::edges).unwrap_or_default();

    EdgeDiff {
        new: now.difference(&before).copied().collect(),
        persisting: now.intersection(&before).copied().collect(),
        vanished: before.difference(&now).copied().collect(),
    }
}

/// Edge changes for a sequence of frames, one entry per frame
pub fn track_edges(frames: &[GrainGraph]) -> Vec<EdgeDiff> {
    frames
        .iter()
        .enumerate()
        .map(|(t, frame)| compare_edges(frame, t.checked_sub(1).map(|p| &frames[p])))
        .collect()
}

/// Grains matched between two networks by exact position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionDiff {
    /// Labels of the first network with no grain at the same position in the second
    pub only_first: Vec<i32>,
    /// Labels of the second network with no grain at the same position in the first
    pub only_second: Vec<i32>,
    /// `(label in first, label in second)` for grains at identical positions
    pub common: Vec<(i32, i32)>,
}

fn position_key(p: &[f64; 3]) -> [u64; 3] {
    // -0.0 and 0.0 must match
    p.map(|c| (c + 0.0).to_bits())
}

/// Match the grains of two networks by identical coordinates.
///
/// Each grain is matched at most once; when several grains share a
/// position they pair up in label order. All outputs are sorted by label.
pub fn compare_positions(first: &GrainGraph, second: &GrainGraph) -> PositionDiff {
    let mut by_position: HashMap<[u64; 3], Vec<i32>> = HashMap::new();
    let mut second_grains: Vec<_> = second.grains().collect();
    second_grains.sort_by_key(|g| std::cmp::Reverse(g.label));
    for g in second_grains {
        by_position
            .entry(position_key(&g.position))
            .or_default()
            .push(g.label);
    }

    let mut first_grains: Vec<_> = first.grains().collect();
    first_grains.sort_by_key(|g| g.label);

    let mut diff = PositionDiff::default();
    for g in first_grains {
        match by_position
            .get_mut(&position_key(&g.position))
            .and_then(Vec::pop)
        {
            Some(other) => diff.common.push((g.label, other)),
            None => diff.only_first.push(g.label),
        }
    }
    diff.only_second = by_position.into_values().flatten().collect();
    diff.only_second.sort_unstable();
    diff
}
