//! Stable GPU radix sort of splats by encoded depth key.
//!
//! A 4-pass 8-bit LSD radix sort over 32-bit keys carrying a 32-bit payload
//! (the splat index). Each pass histograms per block, scans the histograms,
//! and scatters stably, ping-ponging between two (keys, payload) buffer
//! pairs; after four passes the parity returns the sorted data to pair A.
//!
//! Stability matters: splats with identical depths must keep a
//! deterministic order, which the per-tile sort later relies on for
//! reproducible frames.

use crate::gpu::buffers::create_buffer;
use crate::gpu::types::SortParams;
use wgpu::util::DeviceExt;
use wgpu::*;

/// Digits per radix pass.
pub const RADIX: u32 = 256;

/// Keys handled by one sort block (256 threads x 4 rows).
pub const BLOCK_KEYS: u32 = 1024;

/// Number of 8-bit passes over a 32-bit key.
pub const SORT_PASSES: usize = 4;

/// Length the key/payload arrays are padded to: a multiple of the block
/// size, never zero.
pub fn padded_len(splat_count: u32) -> u32 {
    let n = splat_count.max(1);
    ((n + BLOCK_KEYS - 1) / BLOCK_KEYS) * BLOCK_KEYS
}

/// The sorter's working buffers, sized for a splat capacity.
pub struct SortBuffers {
    /// Ping-pong key pair; sorted keys end in `keys[0]`.
    pub keys: [Buffer; 2],

    /// Ping-pong payload pair; sorted splat indices end in `payloads[0]`.
    pub payloads: [Buffer; 2],

    /// Per-digit global base offsets (256 entries).
    pub digit_base: Buffer,

    /// Per-(block, digit) offsets, `num_blocks * 256` entries.
    pub block_hist: Buffer,

    /// Pass parameters: one uniform per digit position, plus one for the
    /// key-encoding dispatch (index [`SORT_PASSES`]).
    pub pass_params: [Buffer; SORT_PASSES + 1],

    pub padded_len: u32,
    pub num_blocks: u32,
}

impl SortBuffers {
    pub fn new(device: &Device, splat_count: u32) -> Self {
        let padded = padded_len(splat_count);
        let num_blocks = padded / BLOCK_KEYS;

        let pair = |label: &str| -> [Buffer; 2] {
            [0, 1].map(|i| {
                create_buffer(
                    device,
                    &format!("sort {} {}", label, i),
                    padded as u64 * 4,
                    BufferUsages::STORAGE | BufferUsages::COPY_SRC,
                )
            })
        };
        let keys = pair("keys");
        let payloads = pair("payload");

        let digit_base = create_buffer(
            device,
            "sort digit base",
            RADIX as u64 * 4,
            BufferUsages::STORAGE,
        );
        let block_hist = create_buffer(
            device,
            "sort block histograms",
            num_blocks as u64 * RADIX as u64 * 4,
            BufferUsages::STORAGE,
        );

        let pass_params = [0u32, 8, 16, 24, 0].map(|shift| {
            device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some("sort pass params"),
                contents: bytemuck::bytes_of(&SortParams {
                    shift,
                    num_blocks,
                    padded_len: padded,
                    splat_count,
                }),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            })
        });

        Self {
            keys,
            payloads,
            digit_base,
            block_hist,
            pass_params,
            padded_len: padded,
            num_blocks,
        }
    }

    /// Rewrite the splat count without reallocating (capacity unchanged).
    pub fn update_splat_count(&self, queue: &Queue, splat_count: u32) {
        for (i, buffer) in self.pass_params.iter().enumerate() {
            let shift = if i < SORT_PASSES { i as u32 * 8 } else { 0 };
            queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&SortParams {
                    shift,
                    num_blocks: self.num_blocks,
                    padded_len: self.padded_len,
                    splat_count,
                }),
            );
        }
    }

    /// The buffer holding the sorted splat indices after a full sort.
    pub fn sorted_indices(&self) -> &Buffer {
        &self.payloads[0]
    }
}

/// Radix sorter pipelines; buffers live in [`SortBuffers`].
pub struct RadixSorter {
    encode_pipeline: ComputePipeline,
    histogram_pipeline: ComputePipeline,
    scan_pipeline: ComputePipeline,
    scatter_pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl RadixSorter {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("radix sort shader"),
            source: ShaderSource::Wgsl(include_str!("radix_sort.wgsl").into()),
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
            label: Some("radix sort bind group layout"),
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
                storage(1, true),  // src keys
                storage(2, true),  // src payload
                storage(3, false), // dst keys
                storage(4, false), // dst payload
                storage(5, false), // digit base
                storage(6, false), // block histograms
                storage(7, true),  // projected splats (encode only)
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("radix sort pipeline layout"),
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
            encode_pipeline: pipeline("sort encode pipeline", "encode_keys"),
            histogram_pipeline: pipeline("sort histogram pipeline", "histogram"),
            scan_pipeline: pipeline("sort scan pipeline", "scan_histograms"),
            scatter_pipeline: pipeline("sort scatter pipeline", "scatter"),
            bind_group_layout,
        }
    }

    /// Bind groups for the encode dispatch plus the four sort passes.
    ///
    /// Even passes read pair A and write pair B, odd passes the reverse;
    /// the encode dispatch writes its keys straight into pair A via the
    /// "destination" bindings.
    pub fn create_bind_groups(
        &self,
        device: &Device,
        buffers: &SortBuffers,
        projected: &Buffer,
    ) -> Vec<BindGroup> {
        let mut bind_groups = Vec::with_capacity(SORT_PASSES + 1);

        for pass in 0..=SORT_PASSES {
            // The encode dispatch (pass == SORT_PASSES) writes pair A.
            let (src, dst) = if pass == SORT_PASSES { (1, 0) } else { (pass % 2, (pass + 1) % 2) };
            bind_groups.push(device.create_bind_group(&BindGroupDescriptor {
                label: Some("radix sort bind group"),
                layout: &self.bind_group_layout,
                entries: &[
                    BindGroupEntry {
                        binding: 0,
                        resource: buffers.pass_params[pass].as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 1,
                        resource: buffers.keys[src].as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 2,
                        resource: buffers.payloads[src].as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 3,
                        resource: buffers.keys[dst].as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 4,
                        resource: buffers.payloads[dst].as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 5,
                        resource: buffers.digit_base.as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 6,
                        resource: buffers.block_hist.as_entire_binding(),
                    },
                    BindGroupEntry {
                        binding: 7,
                        resource: projected.as_entire_binding(),
                    },
                ],
            }));
        }

        bind_groups
    }

    /// Record the key encoding and all four sort passes.
    ///
    /// `bind_groups` comes from [`Self::create_bind_groups`]; after this the
    /// sorted (key, payload) data is back in buffer pair A.
    pub fn encode(
        &self,
        encoder: &mut CommandEncoder,
        bind_groups: &[BindGroup],
        buffers: &SortBuffers,
    ) {
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("sort encode keys pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.encode_pipeline);
            pass.set_bind_group(0, &bind_groups[SORT_PASSES], &[]);
            pass.dispatch_workgroups(buffers.padded_len / 256, 1, 1);
        }

        for p in 0..SORT_PASSES {
            let bind_group = &bind_groups[p];
            let phases = [
                ("sort histogram pass", &self.histogram_pipeline, buffers.num_blocks),
                ("sort scan pass", &self.scan_pipeline, 1),
                ("sort scatter pass", &self.scatter_pipeline, buffers.num_blocks),
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
}
