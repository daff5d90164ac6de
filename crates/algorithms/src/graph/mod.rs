//! Grain adjacency networks and their comparison across frames

mod compare;
mod network;

pub use compare::{compare_edges, compare_positions, track_edges, EdgeDiff, PositionDiff};
pub use network::{ContactLoadReport, Grain, GrainGraph, GrainId, Partition};
