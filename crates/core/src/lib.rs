//! # grainlink Core
//!
//! Core types, traits and I/O for the grainlink grain-contact toolkit.
//!
//! This crate provides:
//! - `VoxelGrid`: dense labeled 3D voxel grid
//! - `Voxel`: integer voxel coordinate used as a set/map key
//! - `Algorithm`: common trait for the analysis algorithms
//! - I/O for voxel volumes (raw binary, TIFF stacks) and delimited tables

pub mod error;
pub mod io;
pub mod voxel;

pub use error::{Error, Result};
pub use voxel::{Voxel, VoxelGrid, FACE_OFFSETS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::voxel::{Voxel, VoxelGrid, FACE_OFFSETS};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in grainlink.
///
/// Algorithms transform input data according to parameters. Only the
/// explicitly injected collaborators (observers, providers) may have side
/// effects.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
