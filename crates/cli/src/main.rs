//! grainlink CLI - grain contact analysis of labeled voxel volumes

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use grainlink_algorithms::contacts::{
    naive_contacts, seeded_contacts, skeleton_contacts_from, ComponentSegmentation, ContactParams,
    ContactReport, PrecomputedLabels, PrecomputedSkeleton, ProgressObserver, SegmentationProvider,
    SeededParams,
};
use grainlink_algorithms::graph::{compare_edges, compare_positions, track_edges, GrainGraph};
use grainlink_algorithms::regions::{centroids, Centroid, CentroidParams};
use grainlink_core::io::{
    frame_files, read_centroid_table, read_contact_pairs, read_positions, read_volume,
    write_centroid_table, write_contact_table, CentroidRecord, RawDataType,
};
use grainlink_core::VoxelGrid;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "grainlink")]
#[command(author, version, about = "Grain contact detection in labeled voxel images", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a volume file
    Info {
        /// Input volume (.tif stack or .raw)
        input: PathBuf,
        #[command(flatten)]
        volume: VolumeArgs,
    },
    /// Contact detection
    Contacts {
        #[command(subcommand)]
        detector: ContactCommands,
    },
    /// Write the centroid table of a label volume
    Centroids {
        /// Input label volume
        labels: PathBuf,
        /// Output CSV (X,Y,Z,Label)
        output: PathBuf,
        /// Skip regions with fewer voxels
        #[arg(long, default_value = "1")]
        min_voxels: usize,
        #[command(flatten)]
        volume: VolumeArgs,
    },
    /// Grain network queries on position and contact files
    Graph {
        #[command(subcommand)]
        query: GraphCommands,
    },
}

/// Layout of `.raw` volumes, which carry no header
#[derive(Args)]
struct VolumeArgs {
    /// Dimensions as x,y,z (required for .raw input)
    #[arg(long)]
    dims: Option<String>,
    /// Raw sample type: u8, u16, i32
    #[arg(long, default_value = "i32")]
    dtype: String,
}

/// Options shared by the erosion-based detectors
#[derive(Args)]
struct DetectorArgs {
    /// Highest level to scan (default: largest dimension + 1)
    #[arg(long)]
    max_levels: Option<usize>,
    /// Treat the input as a binary mask and label its connected components
    #[arg(long)]
    binary: bool,
    #[command(flatten)]
    volume: VolumeArgs,
}

// ─── Contact subcommands ────────────────────────────────────────────────

#[derive(Subcommand)]
enum ContactCommands {
    /// Scan every voxel at every erosion level
    Naive {
        /// Input label volume
        labels: PathBuf,
        /// Output contact table (CSV)
        output: PathBuf,
        #[command(flatten)]
        detector: DetectorArgs,
    },
    /// Scan only the voxels of a skeleton mask
    Skeleton {
        /// Input label volume
        labels: PathBuf,
        /// Skeleton mask volume (same dimensions)
        skeleton: PathBuf,
        /// Output contact table (CSV)
        output: PathBuf,
        #[command(flatten)]
        detector: DetectorArgs,
    },
    /// Grow grains from their centroids, erode what growth does not reach
    Seeded {
        /// Input label volume
        labels: PathBuf,
        /// Output contact table (CSV)
        output: PathBuf,
        /// Centroid table (X,Y,Z,Label); computed from the labels if absent
        #[arg(short, long)]
        centroids: Option<PathBuf>,
        /// Search radius for centroids that miss their grain
        #[arg(short = 'r', long, default_value = "3")]
        search_radius: usize,
        #[command(flatten)]
        detector: DetectorArgs,
    },
}

// ─── Graph subcommands ──────────────────────────────────────────────────

#[derive(Subcommand)]
enum GraphCommands {
    /// Grain count, edges and connectivity of one network
    Summary {
        /// Position file (Label Z Y X)
        positions: PathBuf,
        /// Contact file (Label1 Label2 ...)
        contacts: PathBuf,
    },
    /// Compare two networks, e.g. consecutive time steps
    Compare {
        positions_a: PathBuf,
        contacts_a: PathBuf,
        positions_b: PathBuf,
        contacts_b: PathBuf,
    },
    /// Contact changes along a time series, one frame per file
    Track {
        /// Directory of position files, one per time step
        positions_dir: PathBuf,
        /// Directory of contact files, paired with positions by sorted name
        contacts_dir: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Shows the detector level on a spinner
struct SpinnerProgress {
    pb: ProgressBar,
    total: usize,
}

impl SpinnerProgress {
    fn new() -> Self {
        Self {
            pb: spinner("Detecting contacts..."),
            total: 0,
        }
    }
}

impl ProgressObserver for SpinnerProgress {
    fn on_progress(&mut self, level: usize, new_pairs: usize) {
        self.total += new_pairs;
        self.pb.set_message(format!(
            "Level {}: {} new contacts ({} total)",
            level, new_pairs, self.total
        ));
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}

fn parse_dims(s: &str) -> Result<(usize, usize, usize)> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        anyhow::bail!("Dimensions must be 'x,y,z', got: {}", s);
    }
    let x: usize = parts[0].parse().context("Invalid x dimension")?;
    let y: usize = parts[1].parse().context("Invalid y dimension")?;
    let z: usize = parts[2].parse().context("Invalid z dimension")?;
    Ok((x, y, z))
}

fn read_grid(path: &Path, volume: &VolumeArgs) -> Result<VoxelGrid> {
    let layout = match &volume.dims {
        Some(dims) => {
            let dtype: RawDataType = volume.dtype.parse().context("Invalid --dtype")?;
            Some((parse_dims(dims)?, dtype))
        }
        None => None,
    };
    let pb = spinner("Reading volume...");
    let grid = read_volume(path, layout)
        .with_context(|| format!("Failed to read volume {}", path.display()))?;
    pb.finish_and_clear();
    let (x, y, z) = grid.dims();
    info!("Input: {} x {} x {} ({} voxels)", x, y, z, grid.len());
    Ok(grid)
}

/// Label volume for the detectors, segmenting a binary mask on request
fn read_labels(path: &Path, detector: &DetectorArgs) -> Result<VoxelGrid> {
    let grid = read_grid(path, &detector.volume)?;
    let provider: Box<dyn SegmentationProvider> = if detector.binary {
        Box::new(ComponentSegmentation::new(grid))
    } else {
        Box::new(PrecomputedLabels::new(grid))
    };
    let labels = provider
        .labels()
        .context("Failed to segment input mask")?
        .into_owned();
    Ok(labels)
}

fn write_contacts(report: &ContactReport, path: &Path) -> Result<()> {
    write_contact_table(path, &report.contacts.export())
        .with_context(|| format!("Failed to write contact table {}", path.display()))
}

fn read_centroids(path: &Path) -> Result<Vec<Centroid>> {
    let table = read_centroid_table(path)
        .with_context(|| format!("Failed to read centroid table {}", path.display()))?;
    if !table.is_clean() {
        warn!("{}: {} malformed lines skipped", path.display(), table.rejected.len());
    }
    Ok(table.records.into_iter().map(Centroid::from).collect())
}

fn load_network(positions: &Path, contacts: &Path) -> Result<GrainGraph> {
    let positions_table = read_positions(positions)
        .with_context(|| format!("Failed to read positions {}", positions.display()))?;
    let pairs_table = read_contact_pairs(contacts)
        .with_context(|| format!("Failed to read contacts {}", contacts.display()))?;
    for (path, rejected) in [
        (positions, positions_table.rejected.len()),
        (contacts, pairs_table.rejected.len()),
    ] {
        if rejected > 0 {
            warn!("{}: {} malformed lines skipped", path.display(), rejected);
        }
    }

    let mut graph = GrainGraph::new();
    graph.load_positions(positions_table.records);
    let load = graph.load_contacts(pairs_table.records);
    if !load.skipped.is_empty() {
        warn!(
            "{}: {} contacts reference unknown grains or a single grain",
            contacts.display(),
            load.skipped.len()
        );
    }
    Ok(graph)
}

fn report_contacts(name: &str, report: &ContactReport, path: &Path, elapsed: std::time::Duration) {
    println!("{} contacts saved to: {}", name, path.display());
    println!("  Contacts: {}", report.contacts.len());
    println!("  Levels: {}", report.last_level);
    if report.growth_levels > 0 {
        println!("  Growth levels: {}", report.growth_levels);
    }
    if report.fallback_used {
        println!("  Erosion fallback: used");
    }
    for failure in &report.seed_failures {
        println!("  Seed failure: {}", failure);
    }
    if !report.converged {
        warn!("Level budget exhausted; the contact table is a partial result");
    }
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, volume } => {
            let grid = read_grid(&input, &volume)?;
            let summary = grid.summary();
            let (x, y, z) = summary.dims;

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} x {} ({} voxels)", x, y, z, grid.len());
            println!(
                "Foreground: {} ({:.1}%)",
                summary.foreground,
                100.0 * summary.foreground as f64 / grid.len().max(1) as f64
            );
            println!("Labels: {}", summary.label_count);
            if let (Some(min), Some(max)) = (summary.min_label, summary.max_label) {
                println!("  Range: {} - {}", min, max);
            }
        }

        // ── Contacts ─────────────────────────────────────────────────
        Commands::Contacts { detector } => match detector {
            ContactCommands::Naive {
                labels,
                output,
                detector,
            } => {
                let grid = read_labels(&labels, &detector)?;
                let params = ContactParams {
                    max_levels: detector.max_levels,
                };
                let start = Instant::now();
                let report = naive_contacts(&grid, &params, &mut SpinnerProgress::new())
                    .context("Naive contact detection failed")?;
                let elapsed = start.elapsed();
                write_contacts(&report, &output)?;
                report_contacts("Naive", &report, &output, elapsed);
            }

            ContactCommands::Skeleton {
                labels,
                skeleton,
                output,
                detector,
            } => {
                let grid = read_labels(&labels, &detector)?;
                let mask = PrecomputedSkeleton::new(read_grid(&skeleton, &detector.volume)?);
                let params = ContactParams {
                    max_levels: detector.max_levels,
                };
                let start = Instant::now();
                let report = skeleton_contacts_from(&grid, &mask, &params, &mut SpinnerProgress::new())
                    .with_context(|| {
                        format!("Skeleton contact detection failed for {}", skeleton.display())
                    })?;
                let elapsed = start.elapsed();
                write_contacts(&report, &output)?;
                report_contacts("Skeleton", &report, &output, elapsed);
            }

            ContactCommands::Seeded {
                labels,
                output,
                centroids: centroid_file,
                search_radius,
                detector,
            } => {
                let grid = read_labels(&labels, &detector)?;
                let seeds = match centroid_file {
                    Some(path) => read_centroids(&path)?,
                    None => centroids(&grid, &CentroidParams::default()),
                };
                let params = SeededParams {
                    contact: ContactParams {
                        max_levels: detector.max_levels,
                    },
                    seed_search_radius: search_radius,
                };
                let start = Instant::now();
                let report = seeded_contacts(&grid, &seeds, &params, &mut SpinnerProgress::new())
                    .context("Seeded contact detection failed")?;
                let elapsed = start.elapsed();
                write_contacts(&report, &output)?;
                report_contacts("Seeded", &report, &output, elapsed);
            }
        },

        // ── Centroids ────────────────────────────────────────────────
        Commands::Centroids {
            labels,
            output,
            min_voxels,
            volume,
        } => {
            let grid = read_grid(&labels, &volume)?;
            let start = Instant::now();
            let found = centroids(&grid, &CentroidParams { min_voxels });
            let elapsed = start.elapsed();
            let records: Vec<CentroidRecord> = found.iter().map(CentroidRecord::from).collect();
            write_centroid_table(&output, &records)
                .with_context(|| format!("Failed to write centroid table {}", output.display()))?;
            println!("Centroids saved to: {}", output.display());
            println!("  Regions: {}", records.len());
            println!("  Processing time: {:.2?}", elapsed);
        }

        // ── Graph ────────────────────────────────────────────────────
        Commands::Graph { query } => match query {
            GraphCommands::Summary {
                positions,
                contacts,
            } => {
                let graph = load_network(&positions, &contacts)?;
                let partition = graph.connectivity_partition();
                let counts = graph.neighbor_counts();
                let max_degree = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
                let mean_degree = if counts.is_empty() {
                    0.0
                } else {
                    counts.iter().map(|&(_, n)| n).sum::<usize>() as f64 / counts.len() as f64
                };

                println!("Grains: {}", graph.len());
                println!("Contacts: {}", graph.edges().len());
                println!("  Connected grains: {}", partition.connected.len());
                println!("  Unconnected grains: {}", partition.unconnected.len());
                println!("  Mean coordination number: {:.2}", mean_degree);
                println!("  Max coordination number: {}", max_degree);
            }

            GraphCommands::Compare {
                positions_a,
                contacts_a,
                positions_b,
                contacts_b,
            } => {
                let first = load_network(&positions_a, &contacts_a)?;
                let second = load_network(&positions_b, &contacts_b)?;
                let grains = compare_positions(&first, &second);
                let edges = compare_edges(&second, Some(&first));

                println!("Grains:");
                println!("  Common (same position): {}", grains.common.len());
                println!("  Only in first: {}", grains.only_first.len());
                println!("  Only in second: {}", grains.only_second.len());
                println!("Contacts:");
                println!("  Persisting: {}", edges.persisting.len());
                println!("  New: {}", edges.new.len());
                println!("  Vanished: {}", edges.vanished.len());
            }

            GraphCommands::Track {
                positions_dir,
                contacts_dir,
            } => {
                let files = frame_files(&positions_dir, &contacts_dir).with_context(|| {
                    format!(
                        "Failed to pair frames in {} and {}",
                        positions_dir.display(),
                        contacts_dir.display()
                    )
                })?;
                if files.is_empty() {
                    warn!("No .txt or .csv frames in {}", positions_dir.display());
                    return Ok(());
                }

                let pb = spinner(&format!("Loading {} frames...", files.len()));
                let frames = files
                    .iter()
                    .map(|(positions, contacts)| load_network(positions, contacts))
                    .collect::<Result<Vec<_>>>()?;
                pb.finish_and_clear();

                println!("Frames: {}", frames.len());
                for ((positions, _), (graph, diff)) in
                    files.iter().zip(frames.iter().zip(track_edges(&frames)))
                {
                    let name = positions
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    println!(
                        "  {}: {} grains, {} contacts (new {}, persisting {}, vanished {})",
                        name,
                        graph.len(),
                        graph.edges().len(),
                        diff.new.len(),
                        diff.persisting.len(),
                        diff.vanished.len()
                    );
                }
            }
        },
    }

    Ok(())
}
