//! GPU exclusive scan against the CPU reference.

use isosplat::gpu::buffers::{create_buffer, create_buffer_init, read_buffer_blocking};
use isosplat::gpu::scan::{padded_tile_count, ScanBuffers, ScanPass};
use isosplat::gpu::GpuContext;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gpu() -> Option<GpuContext> {
    match GpuContext::new_blocking() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            println!("Skipping GPU test (no adapter/device): {e}");
            None
        }
    }
}

fn cpu_exclusive_scan(input: &[u32]) -> (Vec<u32>, u32) {
    let mut out = Vec::with_capacity(input.len());
    let mut running = 0u32;
    for &v in input {
        out.push(running);
        running += v;
    }
    (out, running)
}

fn scan_on_gpu(ctx: &GpuContext, input: &[u32]) -> (Vec<u32>, u32) {
    let device = &ctx.device;
    let n = input.len() as u32;
    let padded = padded_tile_count(n);

    let mut data = input.to_vec();
    data.resize(padded as usize, 0);

    let counts = create_buffer_init(device, "test counts", &data, wgpu::BufferUsages::STORAGE);
    let offsets = create_buffer(
        device,
        "test offsets",
        padded as u64 * 4,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    );

    let pass = ScanPass::new(device);
    let buffers = ScanBuffers::new(device, n);
    let bind_group = pass.create_bind_group(device, &buffers, &counts, &offsets);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("scan test encoder"),
    });
    pass.encode(&mut encoder, &bind_group, &buffers);
    ctx.queue.submit(Some(encoder.finish()));

    let result: Vec<u32> = read_buffer_blocking(device, &ctx.queue, &offsets, input.len().max(1))
        .expect("offsets readback");
    let total: Vec<u32> =
        read_buffer_blocking(device, &ctx.queue, &buffers.total, 1).expect("total readback");

    (result[..input.len()].to_vec(), total[0])
}

#[test]
fn scan_matches_cpu_reference() {
    let Some(ctx) = gpu() else { return };

    let mut rng = StdRng::seed_from_u64(3);
    for n in [0usize, 1, 2, 3, 256, 511, 512, 513, 8192] {
        let input: Vec<u32> = (0..n).map(|_| rng.gen_range(0..50)).collect();
        let (gpu_offsets, gpu_total) = scan_on_gpu(&ctx, &input);
        let (cpu_offsets, cpu_total) = cpu_exclusive_scan(&input);

        assert_eq!(gpu_offsets, cpu_offsets, "offsets differ at n = {n}");
        assert_eq!(gpu_total, cpu_total, "total differs at n = {n}");

        // The spec invariant: last offset + last count = total.
        if n > 0 {
            assert_eq!(gpu_offsets[n - 1] + input[n - 1], gpu_total);
        }
    }
}

#[test]
fn scan_of_uniform_ones_is_identity_ramp() {
    let Some(ctx) = gpu() else { return };

    let input = vec![1u32; 1000];
    let (offsets, total) = scan_on_gpu(&ctx, &input);
    assert_eq!(total, 1000);
    for (i, &o) in offsets.iter().enumerate() {
        assert_eq!(o, i as u32);
    }
}
