//! CPU reference rendering.
//!
//! A sequential implementation of the full pipeline - projection, depth
//! ordering, tile binning, compositing - using the same predicates and
//! constants as the GPU kernels. This is a test oracle, not a product path:
//! the test suite compares every GPU stage against it.

mod reference;

pub use reference::{
    bin_splats, composite_image, light_dir, project_splats, render_reference, sorted_order,
    tile_range, GridDims, ReferenceBinning,
};
