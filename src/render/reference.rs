//! The sequential oracle for the GPU pipeline.
//!
//! Every function mirrors one GPU stage with the same arithmetic, in the
//! same order, so that stage outputs can be compared directly (floats up to
//! rounding, integer artefacts exactly). When a kernel changes, change the
//! mirror here and the expectations in the test suite together.

use crate::core::{Camera, RendererConfig, SplatCloud};
use crate::gpu::types::{encode_depth_key, ProjectedSplatGpu, FAR_DEPTH};
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// The fixed diagonal light of the rasteriser.
pub fn light_dir() -> Vector3<f32> {
    Vector3::new(0.5773502691896258, 0.5773502691896258, 0.5773502691896258)
}

/// Contributions below this alpha are skipped, as in the raster kernel.
const MIN_ALPHA: f32 = 1e-4;

/// Tile grid dimensions shared by the binning helpers.
#[derive(Clone, Copy, Debug)]
pub struct GridDims {
    pub tile_size: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl GridDims {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            tile_size,
            tiles_x: ((width + tile_size - 1) / tile_size).max(1),
            tiles_y: ((height + tile_size - 1) / tile_size).max(1),
        }
    }

    pub fn num_tiles(&self) -> u32 {
        self.tiles_x * self.tiles_y
    }
}

/// Binning output: CSR-style segmented tile lists.
#[derive(Clone, Debug)]
pub struct ReferenceBinning {
    pub counts: Vec<u32>,
    pub offsets: Vec<u32>,
    pub indices: Vec<u32>,
    pub total: u32,
}

fn clip_to_pixel(clip: &Vector4<f32>, width: f32, height: f32) -> Vector2<f32> {
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    Vector2::new(
        (ndc_x * 0.5 + 0.5) * width,
        (1.0 - (ndc_y * 0.5 + 0.5)) * height,
    )
}

/// Mirror of the projection kernel.
pub fn project_splats(
    cloud: &SplatCloud,
    camera: &Camera,
    aabb_padding: f32,
) -> Vec<ProjectedSplatGpu> {
    let vp: Matrix4<f32> = camera.view_projection();
    let width = camera.width as f32;
    let height = camera.height as f32;
    let eye = camera.eye.coords;

    cloud
        .splats
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let centre = s.centre;
            let clip = vp * Vector4::new(centre.x, centre.y, centre.z, 1.0);
            if clip.w <= 0.0 {
                return ProjectedSplatGpu {
                    bounds_min: [0.0, 0.0],
                    bounds_max: [-1.0, -1.0],
                    depth: FAR_DEPTH,
                    screen_radius: 0.0,
                    original_index: i as u32,
                    _pad: 0,
                };
            }

            let centre_px = clip_to_pixel(&clip, width, height);

            let mut screen_radius = 0.0f32;
            for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
                for dir in [1.0f32, -1.0] {
                    let probe = centre + dir * s.radius * axis;
                    let probe_clip = vp * Vector4::new(probe.x, probe.y, probe.z, 1.0);
                    if probe_clip.w > 0.0 {
                        let probe_px = clip_to_pixel(&probe_clip, width, height);
                        screen_radius = screen_radius.max((probe_px - centre_px).norm());
                    }
                }
            }

            let pad = aabb_padding * screen_radius;
            ProjectedSplatGpu {
                bounds_min: [centre_px.x - pad, centre_px.y - pad],
                bounds_max: [centre_px.x + pad, centre_px.y + pad],
                depth: (centre - eye).norm(),
                screen_radius,
                original_index: i as u32,
                _pad: 0,
            }
        })
        .collect()
}

/// Mirror of the sort contract: splat indices in ascending encoded-key
/// order, ties kept in index order (the radix sort is stable).
pub fn sorted_order(projected: &[ProjectedSplatGpu]) -> Vec<u32> {
    let mut order: Vec<u32> = (0..projected.len() as u32).collect();
    order.sort_by_key(|&i| encode_depth_key(projected[i as usize].depth));
    order
}

/// Mirror of the binning overlap predicate: the clamped tile range of a
/// projected splat, or None if it touches no tile.
pub fn tile_range(
    p: &ProjectedSplatGpu,
    viewport: (f32, f32),
    grid: &GridDims,
) -> Option<(u32, u32, u32, u32)> {
    if p.bounds_min[0] >= p.bounds_max[0] || p.bounds_min[1] >= p.bounds_max[1] {
        return None;
    }
    if p.bounds_max[0] < 0.0
        || p.bounds_max[1] < 0.0
        || p.bounds_min[0] >= viewport.0
        || p.bounds_min[1] >= viewport.1
    {
        return None;
    }

    let t = grid.tile_size as f32;
    let last_tx = grid.tiles_x as i32 - 1;
    let last_ty = grid.tiles_y as i32 - 1;
    let min_tx = ((p.bounds_min[0] / t).floor() as i32).clamp(0, last_tx) as u32;
    let max_tx = ((p.bounds_max[0] / t).floor() as i32).clamp(0, last_tx) as u32;
    let min_ty = ((p.bounds_min[1] / t).floor() as i32).clamp(0, last_ty) as u32;
    let max_ty = ((p.bounds_max[1] / t).floor() as i32).clamp(0, last_ty) as u32;
    Some((min_tx, max_tx, min_ty, max_ty))
}

/// Mirror of count + scan + fill + per-tile sort.
///
/// The sequential walk appends in sorted order, so segments come out
/// already ordered; the final per-tile sort (ascending depth, index
/// tie-break) is still applied to match the GPU contract exactly.
pub fn bin_splats(
    projected: &[ProjectedSplatGpu],
    order: &[u32],
    viewport: (f32, f32),
    grid: &GridDims,
) -> ReferenceBinning {
    let num_tiles = grid.num_tiles() as usize;
    let mut counts = vec![0u32; num_tiles];

    for &i in order {
        if let Some((min_tx, max_tx, min_ty, max_ty)) =
            tile_range(&projected[i as usize], viewport, grid)
        {
            for ty in min_ty..=max_ty {
                for tx in min_tx..=max_tx {
                    counts[(ty * grid.tiles_x + tx) as usize] += 1;
                }
            }
        }
    }

    let mut offsets = vec![0u32; num_tiles];
    let mut running = 0u32;
    for (offset, &count) in offsets.iter_mut().zip(counts.iter()) {
        *offset = running;
        running += count;
    }
    let total = running;

    let mut cursors = offsets.clone();
    let mut indices = vec![0u32; total as usize];
    for &i in order {
        if let Some((min_tx, max_tx, min_ty, max_ty)) =
            tile_range(&projected[i as usize], viewport, grid)
        {
            for ty in min_ty..=max_ty {
                for tx in min_tx..=max_tx {
                    let tile = (ty * grid.tiles_x + tx) as usize;
                    indices[cursors[tile] as usize] = i;
                    cursors[tile] += 1;
                }
            }
        }
    }

    for tile in 0..num_tiles {
        let start = offsets[tile] as usize;
        let end = start + counts[tile] as usize;
        indices[start..end].sort_by(|&a, &b| {
            let da = projected[a as usize].depth;
            let db = projected[b as usize].depth;
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
    }

    ReferenceBinning {
        counts,
        offsets,
        indices,
        total,
    }
}

/// Mirror of the raster kernel: linear RGB per pixel, row-major.
pub fn render_reference(
    cloud: &SplatCloud,
    camera: &Camera,
    config: &RendererConfig,
) -> Vec<[f32; 3]> {
    let projected = project_splats(cloud, camera, config.aabb_padding);
    let order = sorted_order(&projected);
    let grid = GridDims::new(camera.width, camera.height, config.tile_size);
    let viewport = (camera.width as f32, camera.height as f32);
    let binning = bin_splats(&projected, &order, viewport, &grid);

    let background = Vector3::from(config.background);
    let light = light_dir();
    let mut image = vec![[0.0f32; 3]; (camera.width * camera.height) as usize];

    for py in 0..camera.height {
        for px in 0..camera.width {
            let tile = ((py / config.tile_size) * grid.tiles_x + px / config.tile_size) as usize;
            let base = binning.offsets[tile] as usize;
            let len = binning.counts[tile] as usize;
            let pixel = Vector2::new(px as f32 + 0.5, py as f32 + 0.5);

            let mut colour = Vector3::zeros();
            let mut transmittance = 1.0f32;

            for &i in &binning.indices[base..base + len] {
                let p = &projected[i as usize];
                if pixel.x < p.bounds_min[0]
                    || pixel.x > p.bounds_max[0]
                    || pixel.y < p.bounds_min[1]
                    || pixel.y > p.bounds_max[1]
                {
                    continue;
                }

                let centre = Vector2::new(
                    0.5 * (p.bounds_min[0] + p.bounds_max[0]),
                    0.5 * (p.bounds_min[1] + p.bounds_max[1]),
                );
                let d = (pixel - centre).norm() / p.screen_radius;
                let weight = (-0.5 * d * d / (config.sigma * config.sigma)).exp();

                let s = &cloud.splats[i as usize];
                let alpha = weight * s.opacity;
                if alpha < MIN_ALPHA {
                    continue;
                }

                let lambert = s.normal.normalize().dot(&light).max(0.0);
                let lit = s.colour * (0.85 + 0.15 * lambert);

                colour += transmittance * alpha * lit;
                transmittance *= 1.0 - alpha;

                if 1.0 - transmittance >= config.early_alpha_cutoff {
                    break;
                }
            }

            colour += transmittance * background;
            image[(py * camera.width + px) as usize] = [colour.x, colour.y, colour.z];
        }
    }

    image
}

/// Quantise a linear reference image to RGBA8, as the storage texture does.
pub fn composite_image(linear: &[[f32; 3]], width: u32, height: u32) -> image::RgbaImage {
    let mut img = image::RgbaImage::new(width, height);
    for (i, pixel) in linear.iter().enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        let quantise = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        img.put_pixel(
            x,
            y,
            image::Rgba([quantise(pixel[0]), quantise(pixel[1]), quantise(pixel[2]), 255]),
        );
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Splat;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn white_splat_at(centre: Vector3<f32>, radius: f32) -> Splat {
        Splat::new(
            centre,
            radius,
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            1.0,
        )
    }

    fn test_camera() -> Camera {
        Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin(), 256, 256)
    }

    #[test]
    fn test_projection_is_centred_and_symmetric() {
        let mut cloud = SplatCloud::new();
        cloud.push(white_splat_at(Vector3::zeros(), 0.1));

        let projected = project_splats(&cloud, &test_camera(), 1.5);
        let p = &projected[0];

        assert!(p.screen_radius > 0.0);
        assert_relative_eq!(p.depth, 3.0, epsilon = 1e-5);
        // AABB symmetric about the image centre.
        let cx = 0.5 * (p.bounds_min[0] + p.bounds_max[0]);
        let cy = 0.5 * (p.bounds_min[1] + p.bounds_max[1]);
        assert_relative_eq!(cx, 128.0, epsilon = 1e-2);
        assert_relative_eq!(cy, 128.0, epsilon = 1e-2);
    }

    #[test]
    fn test_behind_camera_is_empty() {
        let mut cloud = SplatCloud::new();
        cloud.push(white_splat_at(Vector3::new(0.0, 0.0, 10.0), 0.1));

        let projected = project_splats(&cloud, &test_camera(), 1.5);
        let p = &projected[0];
        assert!(p.bounds_min[0] > p.bounds_max[0]);
        assert_eq!(p.depth, FAR_DEPTH);

        let grid = GridDims::new(256, 256, 16);
        assert!(tile_range(p, (256.0, 256.0), &grid).is_none());
    }

    #[test]
    fn test_offscreen_splat_touches_no_tile() {
        let p = ProjectedSplatGpu {
            bounds_min: [-50.0, 10.0],
            bounds_max: [-10.0, 40.0],
            depth: 1.0,
            screen_radius: 10.0,
            original_index: 0,
            _pad: 0,
        };
        let grid = GridDims::new(256, 256, 16);
        assert!(tile_range(&p, (256.0, 256.0), &grid).is_none());
    }

    #[test]
    fn test_straddling_splat_touches_four_tiles() {
        let p = ProjectedSplatGpu {
            bounds_min: [14.0, 14.0],
            bounds_max: [18.0, 18.0],
            depth: 1.0,
            screen_radius: 1.0,
            original_index: 0,
            _pad: 0,
        };
        let grid = GridDims::new(64, 64, 16);
        let (min_tx, max_tx, min_ty, max_ty) = tile_range(&p, (64.0, 64.0), &grid).unwrap();
        assert_eq!((min_tx, max_tx, min_ty, max_ty), (0, 1, 0, 1));
    }

    #[test]
    fn test_binning_invariants() {
        let mut cloud = SplatCloud::new();
        cloud.push(white_splat_at(Vector3::zeros(), 0.1));
        cloud.push(white_splat_at(Vector3::new(0.3, 0.2, 0.1), 0.05));

        let camera = test_camera();
        let projected = project_splats(&cloud, &camera, 1.5);
        let order = sorted_order(&projected);
        let grid = GridDims::new(256, 256, 16);
        let binning = bin_splats(&projected, &order, (256.0, 256.0), &grid);

        assert_eq!(binning.counts.iter().sum::<u32>(), binning.total);
        assert_eq!(binning.indices.len(), binning.total as usize);

        // Every binned splat overlaps its tile; segments ascend in depth.
        for tile in 0..grid.num_tiles() as usize {
            let start = binning.offsets[tile] as usize;
            let segment = &binning.indices[start..start + binning.counts[tile] as usize];
            let tx = tile as u32 % grid.tiles_x;
            let ty = tile as u32 / grid.tiles_x;
            let mut last_depth = f32::NEG_INFINITY;
            for &i in segment {
                let (min_tx, max_tx, min_ty, max_ty) =
                    tile_range(&projected[i as usize], (256.0, 256.0), &grid).unwrap();
                assert!(tx >= min_tx && tx <= max_tx && ty >= min_ty && ty <= max_ty);
                let depth = projected[i as usize].depth;
                assert!(depth >= last_depth);
                last_depth = depth;
            }
        }
    }
}
