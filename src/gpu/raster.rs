//! Tile rasterisation into the output storage texture.

use wgpu::*;

/// Pixels per workgroup edge of the raster kernel.
pub const RASTER_TILE_WG: u32 = 8;

pub struct RasterPass {
    pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl RasterPass {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("raster shader"),
            source: ShaderSource::Wgsl(include_str!("raster.wgsl").into()),
        });

        let storage = |binding: u32| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::COMPUTE,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("raster bind group layout"),
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
                storage(1), // projected splats
                storage(2), // splat attributes
                storage(3), // splat normals
                storage(4), // tile offsets
                storage(5), // tile counts
                storage(6), // tile indices
                BindGroupLayoutEntry {
                    binding: 7,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::StorageTexture {
                        access: StorageTextureAccess::WriteOnly,
                        format: TextureFormat::Rgba8Unorm,
                        view_dimension: TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("raster pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&ComputePipelineDescriptor {
            label: Some("raster pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "rasterise",
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_bind_group(
        &self,
        device: &Device,
        params: &Buffer,
        projected: &Buffer,
        splats: &Buffer,
        normals: &Buffer,
        offsets: &Buffer,
        counts: &Buffer,
        tile_indices: &Buffer,
        output: &TextureView,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("raster bind group"),
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
                    resource: splats.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: normals.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: offsets.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 5,
                    resource: counts.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 6,
                    resource: tile_indices.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 7,
                    resource: BindingResource::TextureView(output),
                },
            ],
        })
    }

    pub fn encode(
        &self,
        encoder: &mut CommandEncoder,
        bind_group: &BindGroup,
        width: u32,
        height: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("raster pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(
            (width + RASTER_TILE_WG - 1) / RASTER_TILE_WG,
            (height + RASTER_TILE_WG - 1) / RASTER_TILE_WG,
            1,
        );
    }
}
