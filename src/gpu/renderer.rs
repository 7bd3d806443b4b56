//! High-level GPU renderer.
//!
//! [`SplatRenderer`] is the single value type owning every GPU resource of
//! the pipeline: pipelines, per-frame buffers, the output texture, and the
//! bind groups tying them together. It is constructed with a viewport,
//! resized on demand, and dropped explicitly; there is no process-wide
//! state.
//!
//! Per-frame control flow: project → encode keys → radix sort → tile count
//! → exclusive scan → (4-byte total readback) → tile fill → per-tile sort →
//! rasterise. The readback is the frame's only host synchronisation and can
//! be disabled via [`ReadbackMode::Conservative`].
//!
//! Error discipline: construction and device errors are `Result`; per-frame
//! anomalies are logged, the frame is skipped or cleared, and the outcome is
//! reported in [`FrameReport`]. The renderer never panics on scene content.

use crate::core::{Camera, ReadbackMode, RendererConfig, SplatCloud};
use crate::gpu::binning::BinningPass;
use crate::gpu::buffers::{create_buffer, read_buffer_blocking};
use crate::gpu::context::{GpuContext, GpuError};
use crate::gpu::present::Presenter;
use crate::gpu::project::ProjectPass;
use crate::gpu::raster::RasterPass;
use crate::gpu::scan::{padded_tile_count, ScanBuffers, ScanPass, MAX_SCAN_BLOCKS, SCAN_BLOCK};
use crate::gpu::sort::{RadixSorter, SortBuffers};
use crate::gpu::types::{FrameUniforms, RasterParams, TileParams};
use image::RgbaImage;
use wgpu::*;

/// Why a frame produced only the background colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No splats, or the scene was replaced by an empty cloud.
    EmptyScene,

    /// The splat-tile pair total exceeded `splats * overlap_limit`,
    /// indicating mis-projected bounds upstream.
    PathologicalOverlap { total: u32, limit: u32 },
}

/// Outcome of one rendered frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameReport {
    pub splat_count: u32,

    /// Total splat-tile pairs binned this frame. In zero-readback mode this
    /// is the conservative capacity bound, not a measured count.
    pub tile_pairs: u32,

    pub skipped: Option<SkipReason>,
}

/// CPU copies of the binning outputs, for diagnostics and tests.
#[derive(Clone, Debug)]
pub struct TileLists {
    pub counts: Vec<u32>,
    pub offsets: Vec<u32>,
    pub total: u32,
    pub indices: Vec<u32>,
}

#[derive(Clone, Copy, Debug)]
struct TileGrid {
    tiles_x: u32,
    tiles_y: u32,
    num_tiles: u32,
}

impl TileGrid {
    fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tiles_x = ((width + tile_size - 1) / tile_size).max(1);
        let tiles_y = ((height + tile_size - 1) / tile_size).max(1);
        Self {
            tiles_x,
            tiles_y,
            num_tiles: tiles_x * tiles_y,
        }
    }
}

struct FrameBindings {
    project: BindGroup,
    sort: Vec<BindGroup>,
    scan: BindGroup,
    binning: BindGroup,
    raster: BindGroup,
}

pub struct SplatRenderer {
    ctx: GpuContext,
    config: RendererConfig,
    width: u32,
    height: u32,
    grid: TileGrid,

    project: ProjectPass,
    sorter: RadixSorter,
    scan: ScanPass,
    binning: BinningPass,
    raster: RasterPass,
    presenter: Option<Presenter>,
    present_bind: Option<BindGroup>,

    splat_count: u32,
    splat_capacity: u32,
    splats_buf: Buffer,
    normals_buf: Buffer,
    projected_buf: Buffer,
    frame_uniforms: Buffer,
    sort_buffers: SortBuffers,

    counts_buf: Buffer,
    offsets_buf: Buffer,
    cursors_buf: Buffer,
    scan_buffers: ScanBuffers,
    tile_params: Buffer,
    raster_params: Buffer,
    staging_total: Buffer,

    pair_capacity: u32,
    tile_indices_buf: Buffer,

    output: Texture,
    output_view: TextureView,

    bindings: FrameBindings,
}

impl SplatRenderer {
    /// Create a renderer with its own GPU context.
    pub fn new(width: u32, height: u32, config: RendererConfig) -> Result<Self, GpuError> {
        let ctx = GpuContext::new_blocking()?;
        Self::with_context(ctx, width, height, config)
    }

    /// Create a renderer on an existing device/queue.
    pub fn with_context(
        ctx: GpuContext,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self, GpuError> {
        let grid = TileGrid::new(width, height, config.tile_size);
        check_grid(&grid)?;

        let device = &ctx.device;
        let project = ProjectPass::new(device);
        let sorter = RadixSorter::new(device);
        let scan = ScanPass::new(device);
        let binning = BinningPass::new(device);
        let raster = RasterPass::new(device);

        let splat_capacity = 1;
        let splats_buf = create_splat_buffer(device, splat_capacity);
        let normals_buf = create_normal_buffer(device, splat_capacity);
        let projected_buf = create_projected_buffer(device, splat_capacity);
        let sort_buffers = SortBuffers::new(device, splat_capacity);

        let frame_uniforms = create_buffer(
            device,
            "frame uniforms",
            std::mem::size_of::<FrameUniforms>() as u64,
            BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        );
        let tile_params = create_buffer(
            device,
            "tile params",
            std::mem::size_of::<TileParams>() as u64,
            BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        );
        let raster_params = create_buffer(
            device,
            "raster params",
            std::mem::size_of::<RasterParams>() as u64,
            BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        );

        let padded_tiles = padded_tile_count(grid.num_tiles);
        let counts_buf = create_tile_u32_buffer(device, "tile counts", padded_tiles);
        let offsets_buf = create_tile_u32_buffer(device, "tile offsets", padded_tiles);
        let cursors_buf = create_tile_u32_buffer(device, "tile cursors", padded_tiles);
        let scan_buffers = ScanBuffers::new(device, grid.num_tiles);

        let staging_total = create_buffer(
            device,
            "total staging",
            4,
            BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        );

        let pair_capacity = 1024;
        let tile_indices_buf = create_pair_buffer(device, pair_capacity);

        let (output, output_view) = create_output_texture(device, width, height);

        let bindings = build_bindings(
            device,
            &project,
            &sorter,
            &scan,
            &binning,
            &raster,
            &frame_uniforms,
            &tile_params,
            &raster_params,
            &splats_buf,
            &normals_buf,
            &projected_buf,
            &sort_buffers,
            &scan_buffers,
            &counts_buf,
            &offsets_buf,
            &cursors_buf,
            &tile_indices_buf,
            &output_view,
        );

        Ok(Self {
            ctx,
            config,
            width,
            height,
            grid,
            project,
            sorter,
            scan,
            binning,
            raster,
            presenter: None,
            present_bind: None,
            splat_count: 0,
            splat_capacity,
            splats_buf,
            normals_buf,
            projected_buf,
            frame_uniforms,
            sort_buffers,
            counts_buf,
            offsets_buf,
            cursors_buf,
            scan_buffers,
            tile_params,
            raster_params,
            staging_total,
            pair_capacity,
            tile_indices_buf,
            output,
            output_view,
            bindings,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The raw splat attribute buffer, for upstream subsystems that mutate
    /// splats in place (animated scenes). Writes must land between frames.
    pub fn splat_buffer(&self) -> &Buffer {
        &self.splats_buf
    }

    /// The rendered output texture view (RGBA8-unorm storage).
    pub fn output_view(&self) -> &TextureView {
        &self.output_view
    }

    /// Upload a splat cloud, growing the splat-dependent buffers if needed.
    pub fn set_splats(&mut self, cloud: &SplatCloud) {
        let n = cloud.len() as u32;

        if n > self.splat_capacity {
            let device = &self.ctx.device;
            let capacity = n.next_power_of_two();
            log::info!(
                "growing splat buffers: {} -> {} capacity",
                self.splat_capacity,
                capacity
            );
            self.splat_capacity = capacity;
            self.splats_buf = create_splat_buffer(device, capacity);
            self.normals_buf = create_normal_buffer(device, capacity);
            self.projected_buf = create_projected_buffer(device, capacity);
            self.sort_buffers = SortBuffers::new(device, capacity);
            self.rebuild_bindings();
        }

        if n > 0 {
            self.ctx.queue.write_buffer(
                &self.splats_buf,
                0,
                bytemuck::cast_slice(&cloud.packed_attributes()),
            );
            self.ctx.queue.write_buffer(
                &self.normals_buf,
                0,
                bytemuck::cast_slice(&cloud.packed_normals()),
            );
        }

        self.splat_count = n;
        self.sort_buffers.update_splat_count(&self.ctx.queue, n);

        if let ReadbackMode::Conservative { pairs_per_splat } = self.config.readback {
            let needed = n.saturating_mul(pairs_per_splat).max(1024);
            if needed > self.pair_capacity {
                self.grow_pair_capacity(needed);
            }
        }
    }

    /// Rebuild viewport-dependent resources.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GpuError> {
        let grid = TileGrid::new(width, height, self.config.tile_size);
        check_grid(&grid)?;

        let device = &self.ctx.device;
        self.width = width;
        self.height = height;
        self.grid = grid;

        let padded_tiles = padded_tile_count(grid.num_tiles);
        self.counts_buf = create_tile_u32_buffer(device, "tile counts", padded_tiles);
        self.offsets_buf = create_tile_u32_buffer(device, "tile offsets", padded_tiles);
        self.cursors_buf = create_tile_u32_buffer(device, "tile cursors", padded_tiles);
        self.scan_buffers = ScanBuffers::new(device, grid.num_tiles);

        let (output, output_view) = create_output_texture(device, width, height);
        self.output = output;
        self.output_view = output_view;
        self.present_bind = None;

        self.rebuild_bindings();
        Ok(())
    }

    /// Render one frame from `camera` into the output texture.
    ///
    /// A camera whose viewport differs from the renderer's triggers a
    /// resize first. Per-frame anomalies (empty scene, pathological
    /// overlap) clear the output and report a skip instead of failing.
    pub fn render(&mut self, camera: &Camera) -> Result<FrameReport, GpuError> {
        if camera.width != self.width || camera.height != self.height {
            self.resize(camera.width, camera.height)?;
        }

        let n = self.splat_count;
        if n == 0 {
            self.clear_output();
            return Ok(FrameReport {
                splat_count: 0,
                tile_pairs: 0,
                skipped: Some(SkipReason::EmptyScene),
            });
        }

        self.write_frame_params(camera, n);

        // First half of the frame: everything up to the scanned total.
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("frame encoder (project/sort/count/scan)"),
            });
        encoder.clear_buffer(&self.counts_buf, 0, None);
        self.project
            .encode(&mut encoder, &self.bindings.project, n);
        self.sorter
            .encode(&mut encoder, &self.bindings.sort, &self.sort_buffers);
        self.binning
            .encode_count(&mut encoder, &self.bindings.binning, n);
        self.scan
            .encode(&mut encoder, &self.bindings.scan, &self.scan_buffers);
        encoder.copy_buffer_to_buffer(&self.scan_buffers.total, 0, &self.staging_total, 0, 4);
        self.ctx.queue.submit(Some(encoder.finish()));

        // The frame's one host synchronisation point.
        let total = match self.config.readback {
            ReadbackMode::Exact => self.read_total()?,
            ReadbackMode::Conservative { pairs_per_splat } => {
                n.saturating_mul(pairs_per_splat)
            }
        };

        if self.config.readback == ReadbackMode::Exact {
            let limit = (n as u64).saturating_mul(self.config.overlap_limit as u64);
            if (total as u64) > limit {
                log::warn!(
                    "skipping frame: {} splat-tile pairs for {} splats exceeds limit {}",
                    total,
                    n,
                    limit
                );
                self.clear_output();
                return Ok(FrameReport {
                    splat_count: n,
                    tile_pairs: total,
                    skipped: Some(SkipReason::PathologicalOverlap {
                        total,
                        limit: self.config.overlap_limit,
                    }),
                });
            }

            if total > self.pair_capacity {
                self.grow_pair_capacity(total);
                // pair_capacity feeds the fill and raster params.
                self.write_frame_params(camera, n);
            }
        }

        // Second half: fill, per-tile order, rasterise.
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("frame encoder (fill/sort/raster)"),
            });
        encoder.copy_buffer_to_buffer(
            &self.offsets_buf,
            0,
            &self.cursors_buf,
            0,
            padded_tile_count(self.grid.num_tiles) as u64 * 4,
        );
        self.binning
            .encode_fill(&mut encoder, &self.bindings.binning, n);
        self.binning
            .encode_segment_sort(&mut encoder, &self.bindings.binning, self.grid.num_tiles);
        self.raster
            .encode(&mut encoder, &self.bindings.raster, self.width, self.height);
        self.ctx.queue.submit(Some(encoder.finish()));

        log::debug!("frame: {} splats, {} tile pairs", n, total);
        Ok(FrameReport {
            splat_count: n,
            tile_pairs: total,
            skipped: None,
        })
    }

    /// Blit the rendered output into a swap-chain view of the given format.
    pub fn present(&mut self, target: &TextureView, format: TextureFormat) {
        if self.presenter.as_ref().map(|p| p.format()) != Some(format) {
            self.presenter = None;
            self.present_bind = None;
        }
        let device = &self.ctx.device;
        let presenter = self
            .presenter
            .get_or_insert_with(|| Presenter::new(device, format));
        let output_view = &self.output_view;
        let bind_group = self
            .present_bind
            .get_or_insert_with(|| presenter.create_bind_group(device, output_view));

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("present encoder"),
        });
        presenter.encode(&mut encoder, bind_group, target);
        self.ctx.queue.submit(Some(encoder.finish()));
    }

    /// Render a frame and read the output back as an RGBA image.
    ///
    /// For offline rendering and tests; interactive hosts should blit via
    /// [`Self::present`] instead of reading back full frames.
    pub fn render_to_image(&mut self, camera: &Camera) -> Result<RgbaImage, GpuError> {
        self.render(camera)?;
        self.read_output()
    }

    /// Read the output texture back to the CPU.
    pub fn read_output(&self) -> Result<RgbaImage, GpuError> {
        let device = &self.ctx.device;
        let bytes_per_row = (self.width * 4 + 255) / 256 * 256;
        let size = bytes_per_row as u64 * self.height as u64;

        let staging = create_buffer(
            device,
            "image staging",
            size,
            BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        );

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("image readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            ImageCopyTexture {
                texture: &self.output,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            ImageCopyBuffer {
                buffer: &staging,
                layout: ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: None,
                },
            },
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.ctx.queue.submit(Some(encoder.finish()));

        let (tx, rx) = futures::channel::oneshot::channel();
        staging
            .slice(..)
            .map_async(MapMode::Read, move |result| {
                tx.send(result).ok();
            });
        device.poll(Maintain::Wait);
        pollster::block_on(rx).map_err(|_| GpuError::ReadbackLost)??;

        let data = staging.slice(..).get_mapped_range();
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for row in 0..self.height {
            let start = (row * bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + self.width as usize * 4]);
        }
        drop(data);
        staging.unmap();

        Ok(RgbaImage::from_raw(self.width, self.height, pixels)
            .expect("readback size matches image dimensions"))
    }

    /// Read the binning outputs back to the CPU (diagnostics and tests).
    pub fn read_tile_lists(&self) -> Result<TileLists, GpuError> {
        let device = &self.ctx.device;
        let queue = &self.ctx.queue;
        let num_tiles = self.grid.num_tiles as usize;

        let counts: Vec<u32> = read_buffer_blocking(device, queue, &self.counts_buf, num_tiles)?;
        let offsets: Vec<u32> = read_buffer_blocking(device, queue, &self.offsets_buf, num_tiles)?;
        let total = offsets[num_tiles - 1] + counts[num_tiles - 1];
        let stored = total.min(self.pair_capacity) as usize;
        let indices: Vec<u32> = if stored > 0 {
            read_buffer_blocking(device, queue, &self.tile_indices_buf, stored)?
        } else {
            Vec::new()
        };

        Ok(TileLists {
            counts,
            offsets,
            total,
            indices,
        })
    }

    /// Read the sorted splat index permutation (prefix of length N).
    pub fn read_sorted_indices(&self) -> Result<Vec<u32>, GpuError> {
        read_buffer_blocking(
            &self.ctx.device,
            &self.ctx.queue,
            self.sort_buffers.sorted_indices(),
            self.splat_count as usize,
        )
    }

    fn read_total(&self) -> Result<u32, GpuError> {
        let (tx, rx) = futures::channel::oneshot::channel();
        self.staging_total
            .slice(..)
            .map_async(MapMode::Read, move |result| {
                tx.send(result).ok();
            });
        self.ctx.device.poll(Maintain::Wait);
        pollster::block_on(rx).map_err(|_| GpuError::ReadbackLost)??;

        let data = self.staging_total.slice(..).get_mapped_range();
        let total = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        drop(data);
        self.staging_total.unmap();
        Ok(total)
    }

    fn write_frame_params(&self, camera: &Camera, splat_count: u32) {
        let queue = &self.ctx.queue;
        queue.write_buffer(
            &self.frame_uniforms,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(
                camera,
                splat_count,
                self.config.aabb_padding,
            )),
        );
        queue.write_buffer(
            &self.tile_params,
            0,
            bytemuck::bytes_of(&TileParams {
                viewport: [self.width as f32, self.height as f32],
                tile_size: self.config.tile_size,
                tiles_x: self.grid.tiles_x,
                tiles_y: self.grid.tiles_y,
                splat_count,
                num_tiles: self.grid.num_tiles,
                pair_capacity: self.pair_capacity,
            }),
        );
        let bg = self.config.background;
        queue.write_buffer(
            &self.raster_params,
            0,
            bytemuck::bytes_of(&RasterParams {
                background: [bg[0], bg[1], bg[2], 1.0],
                viewport: [self.width as f32, self.height as f32],
                tile_size: self.config.tile_size,
                tiles_x: self.grid.tiles_x,
                sigma: self.config.sigma,
                early_alpha_cutoff: self.config.early_alpha_cutoff,
                pair_capacity: self.pair_capacity,
                _pad: 0,
            }),
        );
    }

    fn grow_pair_capacity(&mut self, needed: u32) {
        let capacity = needed.next_power_of_two();
        log::info!(
            "growing tile index list: {} -> {} entries",
            self.pair_capacity,
            capacity
        );
        self.pair_capacity = capacity;
        self.tile_indices_buf = create_pair_buffer(&self.ctx.device, capacity);
        self.rebuild_bindings();
    }

    /// Clear the output to the background colour (empty or skipped frames).
    fn clear_output(&self) {
        let bg = self.config.background;
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("clear encoder"),
            });
        let _pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("clear output pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &self.output_view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: bg[0] as f64,
                        g: bg[1] as f64,
                        b: bg[2] as f64,
                        a: 1.0,
                    }),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        drop(_pass);
        self.ctx.queue.submit(Some(encoder.finish()));
    }

    fn rebuild_bindings(&mut self) {
        self.bindings = build_bindings(
            &self.ctx.device,
            &self.project,
            &self.sorter,
            &self.scan,
            &self.binning,
            &self.raster,
            &self.frame_uniforms,
            &self.tile_params,
            &self.raster_params,
            &self.splats_buf,
            &self.normals_buf,
            &self.projected_buf,
            &self.sort_buffers,
            &self.scan_buffers,
            &self.counts_buf,
            &self.offsets_buf,
            &self.cursors_buf,
            &self.tile_indices_buf,
            &self.output_view,
        );
    }
}

fn check_grid(grid: &TileGrid) -> Result<(), GpuError> {
    let max_tiles = MAX_SCAN_BLOCKS * SCAN_BLOCK;
    if grid.num_tiles > max_tiles {
        return Err(GpuError::ViewportTooLarge {
            num_tiles: grid.num_tiles,
            max_tiles,
        });
    }
    Ok(())
}

fn create_splat_buffer(device: &Device, capacity: u32) -> Buffer {
    create_buffer(
        device,
        "splat attributes",
        capacity as u64 * 32,
        BufferUsages::STORAGE | BufferUsages::COPY_DST,
    )
}

fn create_normal_buffer(device: &Device, capacity: u32) -> Buffer {
    create_buffer(
        device,
        "splat normals",
        capacity as u64 * 16,
        BufferUsages::STORAGE | BufferUsages::COPY_DST,
    )
}

fn create_projected_buffer(device: &Device, capacity: u32) -> Buffer {
    create_buffer(
        device,
        "projected splats",
        capacity as u64 * 32,
        BufferUsages::STORAGE | BufferUsages::COPY_SRC,
    )
}

fn create_tile_u32_buffer(device: &Device, label: &str, padded_tiles: u32) -> Buffer {
    create_buffer(
        device,
        label,
        padded_tiles as u64 * 4,
        BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
    )
}

fn create_pair_buffer(device: &Device, capacity: u32) -> Buffer {
    create_buffer(
        device,
        "tile indices",
        capacity as u64 * 4,
        BufferUsages::STORAGE | BufferUsages::COPY_SRC,
    )
}

fn create_output_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("rendered output"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm,
        usage: TextureUsages::STORAGE_BINDING
            | TextureUsages::TEXTURE_BINDING
            | TextureUsages::COPY_SRC
            | TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&TextureViewDescriptor::default());
    (texture, view)
}

#[allow(clippy::too_many_arguments)]
fn build_bindings(
    device: &Device,
    project: &ProjectPass,
    sorter: &RadixSorter,
    scan: &ScanPass,
    binning: &BinningPass,
    raster: &RasterPass,
    frame_uniforms: &Buffer,
    tile_params: &Buffer,
    raster_params: &Buffer,
    splats_buf: &Buffer,
    normals_buf: &Buffer,
    projected_buf: &Buffer,
    sort_buffers: &SortBuffers,
    scan_buffers: &ScanBuffers,
    counts_buf: &Buffer,
    offsets_buf: &Buffer,
    cursors_buf: &Buffer,
    tile_indices_buf: &Buffer,
    output_view: &TextureView,
) -> FrameBindings {
    FrameBindings {
        project: project.create_bind_group(device, frame_uniforms, splats_buf, projected_buf),
        sort: sorter.create_bind_groups(device, sort_buffers, projected_buf),
        scan: scan.create_bind_group(device, scan_buffers, counts_buf, offsets_buf),
        binning: binning.create_bind_group(
            device,
            tile_params,
            projected_buf,
            sort_buffers.sorted_indices(),
            counts_buf,
            cursors_buf,
            tile_indices_buf,
            offsets_buf,
        ),
        raster: raster.create_bind_group(
            device,
            raster_params,
            projected_buf,
            splats_buf,
            normals_buf,
            offsets_buf,
            counts_buf,
            tile_indices_buf,
            output_view,
        ),
    }
}
