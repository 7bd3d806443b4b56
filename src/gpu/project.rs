//! Projection stage: world-space splats to screen-space bounds and depth.

use wgpu::*;

/// Threads per workgroup of the projection kernel.
pub const PROJECT_WORKGROUP: u32 = 64;

/// Compute pass projecting every splat to a [`crate::gpu::types::ProjectedSplatGpu`].
pub struct ProjectPass {
    pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl ProjectPass {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("project shader"),
            source: ShaderSource::Wgsl(include_str!("project.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("project bind group layout"),
            entries: &[
                // Frame uniforms
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
                // Splat attributes
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Projected splats
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("project pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&ComputePipelineDescriptor {
            label: Some("project pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "project",
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    pub fn create_bind_group(
        &self,
        device: &Device,
        uniforms: &Buffer,
        splats: &Buffer,
        projected: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("project bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: splats.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: projected.as_entire_binding(),
                },
            ],
        })
    }

    pub fn encode(&self, encoder: &mut CommandEncoder, bind_group: &BindGroup, splat_count: u32) {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("project pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let workgroups = (splat_count + PROJECT_WORKGROUP - 1) / PROJECT_WORKGROUP;
        pass.dispatch_workgroups(workgroups, 1, 1);
    }
}
