//! I/O operations for splat clouds.
//!
//! The placement subsystem produces oriented splat clouds; this module
//! persists them as binary PLY so scenes can be saved, inspected in standard
//! point-cloud viewers, and reloaded without re-running placement.

mod ply;

// Re-export public types and functions
pub use ply::{load_ply, save_ply, PlyError};
