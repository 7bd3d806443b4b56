//! Exclusive prefix scan of per-tile splat counts.
//!
//! Hierarchical: block-local Blelloch scans emit partial totals, a single
//! workgroup scans the totals (and writes the grand total for the one host
//! readback of the frame), and a final pass adds each block's base back in.

use crate::gpu::buffers::create_buffer;
use crate::gpu::types::ScanParams;
use wgpu::util::DeviceExt;
use wgpu::*;

/// Elements scanned by one workgroup.
pub const SCAN_BLOCK: u32 = 512;

/// Hard cap on scan blocks: the block totals must fit one workgroup's scan.
pub const MAX_SCAN_BLOCKS: u32 = 512;

/// Length the counts/offsets arrays are padded to: a multiple of the scan
/// block size, never zero.
pub fn padded_tile_count(num_tiles: u32) -> u32 {
    let n = num_tiles.max(1);
    ((n + SCAN_BLOCK - 1) / SCAN_BLOCK) * SCAN_BLOCK
}

/// Scan working buffers, sized for a tile capacity.
pub struct ScanBuffers {
    pub params: Buffer,

    /// One partial total per scan block.
    pub block_sums: Buffer,

    /// The grand total of all counts (one u32), copied to the staging
    /// buffer for the per-frame readback.
    pub total: Buffer,

    pub padded_count: u32,
    pub num_blocks: u32,
}

impl ScanBuffers {
    pub fn new(device: &Device, num_tiles: u32) -> Self {
        let padded_count = padded_tile_count(num_tiles);
        let num_blocks = padded_count / SCAN_BLOCK;

        let params = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("scan params"),
            contents: bytemuck::bytes_of(&ScanParams {
                count: padded_count,
                num_blocks,
                _pad0: 0,
                _pad1: 0,
            }),
            usage: BufferUsages::UNIFORM,
        });

        let block_sums = create_buffer(
            device,
            "scan block sums",
            MAX_SCAN_BLOCKS as u64 * 4,
            BufferUsages::STORAGE,
        );

        let total = create_buffer(
            device,
            "scan total",
            4,
            BufferUsages::STORAGE | BufferUsages::COPY_SRC,
        );

        Self {
            params,
            block_sums,
            total,
            padded_count,
            num_blocks,
        }
    }
}

/// Exclusive-scan pipelines; buffers live in [`ScanBuffers`].
pub struct ScanPass {
    blocks_pipeline: ComputePipeline,
    block_sums_pipeline: ComputePipeline,
    add_bases_pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl ScanPass {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scan shader"),
            source: ShaderSource::Wgsl(include_str!("scan.wgsl").into()),
        });

        let storage = |binding: u32, read_only: bool| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::COMPUTE,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scan bind group layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage(1, true),  // counts
                storage(2, false), // offsets
                storage(3, false), // block sums
                storage(4, false), // total
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("scan pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label, entry_point| {
            device.create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point,
            })
        };

        Self {
            blocks_pipeline: pipeline("scan blocks pipeline", "scan_blocks"),
            block_sums_pipeline: pipeline("scan block sums pipeline", "scan_block_sums"),
            add_bases_pipeline: pipeline("scan add bases pipeline", "add_block_bases"),
            bind_group_layout,
        }
    }

    pub fn create_bind_group(
        &self,
        device: &Device,
        buffers: &ScanBuffers,
        counts: &Buffer,
        offsets: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("scan bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: buffers.params.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: counts.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: offsets.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: buffers.block_sums.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: buffers.total.as_entire_binding(),
                },
            ],
        })
    }

    pub fn encode(
        &self,
        encoder: &mut CommandEncoder,
        bind_group: &BindGroup,
        buffers: &ScanBuffers,
    ) {
        let phases = [
            ("scan blocks pass", &self.blocks_pipeline, buffers.num_blocks),
            ("scan block sums pass", &self.block_sums_pipeline, 1),
            (
                "scan add bases pass",
                &self.add_bases_pipeline,
                (buffers.padded_count + 255) / 256,
            ),
        ];
        for (label, pipeline, workgroups) in phases {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_tile_count() {
        assert_eq!(padded_tile_count(0), 512);
        assert_eq!(padded_tile_count(1), 512);
        assert_eq!(padded_tile_count(512), 512);
        assert_eq!(padded_tile_count(513), 1024);
        assert_eq!(padded_tile_count(8192), 8192);
    }
}
