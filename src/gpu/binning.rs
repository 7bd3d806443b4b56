//! Tile binning: counting, filling, and per-tile depth ordering.
//!
//! The count and fill kernels walk splats in sorted order and share one
//! overlap predicate (see `binning.wgsl`), so the number of appends per tile
//! always equals the scanned count. Atomic appends race across workgroups;
//! the segment-sort kernel restores ascending depth order per tile before
//! the rasteriser runs.

use wgpu::*;

/// Threads per workgroup of the count/fill kernels.
pub const BINNING_WORKGROUP: u32 = 256;

pub struct BinningPass {
    count_pipeline: ComputePipeline,
    fill_pipeline: ComputePipeline,
    segment_sort_pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl BinningPass {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("binning shader"),
            source: ShaderSource::Wgsl(include_str!("binning.wgsl").into()),
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
            label: Some("binning bind group layout"),
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
                storage(1, true),  // projected splats
                storage(2, true),  // sorted indices
                storage(3, false), // counts (atomic)
                storage(4, false), // cursors (atomic)
                storage(5, false), // tile indices
                storage(6, true),  // offsets
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("binning pipeline layout"),
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
            count_pipeline: pipeline("tile count pipeline", "count_tiles"),
            fill_pipeline: pipeline("tile fill pipeline", "fill_tiles"),
            segment_sort_pipeline: pipeline("tile segment sort pipeline", "sort_tile_segments"),
            bind_group_layout,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_bind_group(
        &self,
        device: &Device,
        params: &Buffer,
        projected: &Buffer,
        sorted_indices: &Buffer,
        counts: &Buffer,
        cursors: &Buffer,
        tile_indices: &Buffer,
        offsets: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("binning bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: projected.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: sorted_indices.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: counts.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: cursors.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 5,
                    resource: tile_indices.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 6,
                    resource: offsets.as_entire_binding(),
                },
            ],
        })
    }

    pub fn encode_count(
        &self,
        encoder: &mut CommandEncoder,
        bind_group: &BindGroup,
        splat_count: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("tile count pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.count_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let workgroups = (splat_count + BINNING_WORKGROUP - 1) / BINNING_WORKGROUP;
        pass.dispatch_workgroups(workgroups, 1, 1);
    }

    pub fn encode_fill(
        &self,
        encoder: &mut CommandEncoder,
        bind_group: &BindGroup,
        splat_count: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("tile fill pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.fill_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let workgroups = (splat_count + BINNING_WORKGROUP - 1) / BINNING_WORKGROUP;
        pass.dispatch_workgroups(workgroups, 1, 1);
    }

    /// One workgroup per tile re-sorts that tile's segment by depth.
    pub fn encode_segment_sort(
        &self,
        encoder: &mut CommandEncoder,
        bind_group: &BindGroup,
        num_tiles: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("tile segment sort pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.segment_sort_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(num_tiles, 1, 1);
    }
}
