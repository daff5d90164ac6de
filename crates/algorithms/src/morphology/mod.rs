//! Mathematical morphology on labeled voxel grids
//!
//! - **Erosion**: one 6-connected step that turns every foreground voxel
//!   with an in-bounds background neighbor into background. Labels of the
//!   surviving voxels are kept, so erosion of a label image shrinks every
//!   grain independently while leaving grain-grain interfaces in place.

mod erode;

pub use erode::{erode, erode_steps, touches_background, Erode, ErodeParams};
