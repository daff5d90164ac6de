//! End-to-end tests of the contact detectors on synthetic grain packings,
//! from label grid to contact table to grain network.

use grainlink_algorithms::contacts::{
    naive_contacts, seeded_contacts, skeleton_contacts, skeleton_contacts_from, ContactParams,
    InterfaceSkeleton, NoProgress, SeededParams,
};
use grainlink_algorithms::graph::GrainGraph;
use grainlink_algorithms::morphology::erode;
use grainlink_algorithms::regions::{centroids, CentroidParams};
use grainlink_core::io::{
    read_contact_pairs, read_contact_table, read_positions, write_contact_table, ContactRecord,
};
use grainlink_core::voxel::{Voxel, VoxelGrid};
use std::collections::BTreeSet;
use std::fs;

const RADIUS: usize = 3;

/// Paint a ball of `label` into the grid, leaving voxels of earlier balls untouched
fn paint_ball(grid: &mut VoxelGrid, center: Voxel, radius: usize, label: i32) {
    let (x_dim, y_dim, z_dim) = grid.dims();
    for i in 0..x_dim {
        for j in 0..y_dim {
            for k in 0..z_dim {
                let v = Voxel::new(i, j, k);
                if v.distance_squared(&center) <= radius * radius && grid.at_voxel(v) == 0 {
                    grid.set(i, j, k, label).unwrap();
                }
            }
        }
    }
}

/// Four balls of radius 3: 1 touches 2 and 3 at a single voxel face each,
/// 4 is isolated
fn ball_packing() -> VoxelGrid {
    let mut grid = VoxelGrid::new(16, 16, 16);
    paint_ball(&mut grid, Voxel::new(4, 4, 4), RADIUS, 1);
    paint_ball(&mut grid, Voxel::new(4, 4, 10), RADIUS, 2);
    paint_ball(&mut grid, Voxel::new(4, 10, 4), RADIUS, 3);
    paint_ball(&mut grid, Voxel::new(12, 12, 12), RADIUS, 4);
    grid
}

/// Two 3x3x3 cubes sharing one face
fn two_cubes() -> VoxelGrid {
    let mut grid = VoxelGrid::new(3, 3, 6);
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..6 {
                grid.set(i, j, k, if k < 3 { 1 } else { 2 }).unwrap();
            }
        }
    }
    grid
}

fn pair_set(records: &[ContactRecord]) -> BTreeSet<(i32, i32)> {
    records.iter().map(|r| (r.label1, r.label2)).collect()
}

#[test]
fn two_cubes_contact_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.csv");

    let report = naive_contacts(&two_cubes(), &ContactParams::default(), &mut NoProgress).unwrap();
    assert!(report.converged);
    write_contact_table(&path, &report.contacts.export()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "Label1,Label2,ContactStrength\n1,2,1\n");

    let table = read_contact_table(&path).unwrap();
    assert!(table.is_clean());
    assert_eq!(
        table.records,
        vec![ContactRecord { label1: 1, label2: 2, strength: 1 }]
    );
}

#[test]
fn erosion_is_monotonic_on_packing() {
    let grid = ball_packing();
    let once = erode(&grid);
    let twice = erode(&once);
    assert!(once.foreground_count() <= grid.foreground_count());
    assert!(twice.foreground_count() <= once.foreground_count());
    assert!(twice.foreground_count() < grid.foreground_count());
}

#[test]
fn naive_finds_touching_balls() {
    let report = naive_contacts(&ball_packing(), &ContactParams::default(), &mut NoProgress).unwrap();
    assert_eq!(pair_set(&report.contacts.export()), BTreeSet::from([(1, 2), (1, 3)]));
    assert!(report.converged);
    assert!(
        report.last_level <= RADIUS + 1,
        "loop ran {} levels for grains of radius {}",
        report.last_level,
        RADIUS
    );
}

#[test]
fn skeleton_covering_interfaces_matches_naive() {
    let grid = ball_packing();
    let params = ContactParams::default();
    let naive = naive_contacts(&grid, &params, &mut NoProgress).unwrap();
    let guided = skeleton_contacts_from(&grid, &InterfaceSkeleton, &params, &mut NoProgress).unwrap();
    assert_eq!(naive.contacts.as_map(), guided.contacts.as_map());

    let cubes = two_cubes();
    let full_mask = VoxelGrid::filled(3, 3, 6, 1);
    let guided = skeleton_contacts(&cubes, &full_mask, &params, &mut NoProgress).unwrap();
    let naive = naive_contacts(&cubes, &params, &mut NoProgress).unwrap();
    assert_eq!(naive.contacts.as_map(), guided.contacts.as_map());
}

#[test]
fn seeded_growth_finds_naive_pairs() {
    let grid = ball_packing();
    let seeds = centroids(&grid, &CentroidParams::default());
    assert_eq!(seeds.len(), 4);

    let seeded = seeded_contacts(&grid, &seeds, &SeededParams::default(), &mut NoProgress).unwrap();
    let naive = naive_contacts(&grid, &ContactParams::default(), &mut NoProgress).unwrap();

    assert_eq!(
        pair_set(&seeded.contacts.export()),
        pair_set(&naive.contacts.export())
    );
    assert!(seeded.seed_failures.is_empty());
    assert!(!seeded.fallback_used);
    // Fronts meet after crossing one ball radius
    assert_eq!(seeded.contacts.strength(1, 2), Some(RADIUS + 1));
}

#[test]
fn seeded_growth_recovers_off_shape_centroid() {
    let grid = ball_packing();
    let mut seeds = centroids(&grid, &CentroidParams::default());
    let off = seeds.iter_mut().find(|c| c.label == 4).unwrap();
    off.voxel = Voxel::new(14, 14, 14);
    assert_eq!(grid.at_voxel(off.voxel), 0);

    let report = seeded_contacts(&grid, &seeds, &SeededParams::default(), &mut NoProgress).unwrap();
    assert!(report.seed_failures.is_empty());
    assert!(!report.fallback_used);
    assert_eq!(pair_set(&report.contacts.export()), BTreeSet::from([(1, 2), (1, 3)]));
}

#[test]
fn seeded_growth_with_unseeded_hub_grain_matches_naive() {
    let grid = ball_packing();
    let mut seeds = centroids(&grid, &CentroidParams::default());
    // Ball 1 touches 2 and 3; its seed lands where no foreground is in reach
    let hub = seeds.iter_mut().find(|c| c.label == 1).unwrap();
    hub.voxel = Voxel::new(15, 0, 0);

    let seeded = seeded_contacts(&grid, &seeds, &SeededParams::default(), &mut NoProgress).unwrap();
    let naive = naive_contacts(&grid, &ContactParams::default(), &mut NoProgress).unwrap();

    assert_eq!(seeded.seed_failures.len(), 1);
    assert_eq!(seeded.seed_failures[0].label, 1);
    assert!(seeded.fallback_used);
    assert_eq!(
        pair_set(&seeded.contacts.export()),
        pair_set(&naive.contacts.export())
    );
    assert_eq!(seeded.contacts.strength(2, 3), None);
    assert_eq!(
        seeded.contacts.strength(1, 2),
        Some(seeded.growth_levels + 1),
        "pairs of the unseeded grain come from the first fallback scan"
    );
}

#[test]
fn contact_file_to_grain_network() {
    let dir = tempfile::tempdir().unwrap();
    let contacts_path = dir.path().join("contacts.csv");
    let positions_path = dir.path().join("positions.txt");

    let grid = ball_packing();
    let report = naive_contacts(&grid, &ContactParams::default(), &mut NoProgress).unwrap();
    write_contact_table(&contacts_path, &report.contacts.export()).unwrap();

    let mut text = String::from("Label Z Y X\n");
    for c in centroids(&grid, &CentroidParams::default()) {
        text.push_str(&format!("{} {} {} {}\n", c.label, c.voxel.k, c.voxel.j, c.voxel.i));
    }
    fs::write(&positions_path, text).unwrap();

    let positions = read_positions(&positions_path).unwrap();
    let pairs = read_contact_pairs(&contacts_path).unwrap();
    assert!(positions.is_clean() && pairs.is_clean());

    let mut graph = GrainGraph::new();
    graph.load_positions(positions.records);
    let load = graph.load_contacts(pairs.records);
    assert_eq!(load.added, 2);
    assert!(load.skipped.is_empty());

    let partition = graph.connectivity_partition();
    assert_eq!(partition.connected, vec![1, 2, 3]);
    assert_eq!(partition.unconnected, vec![4]);

    for g in graph.grains() {
        for n in graph.neighbors(graph.id_of(g.label).unwrap()) {
            let back = graph.id_of(n.label).unwrap();
            assert!(graph.neighbors(back).any(|m| m.label == g.label));
        }
    }

    let ball = graph.lookup(2).unwrap();
    assert_eq!(ball.position, [4.0, 4.0, 10.0]);
}
