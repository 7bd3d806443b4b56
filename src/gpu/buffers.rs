//! GPU buffer management and readback.

use crate::gpu::context::GpuError;
use wgpu::{Buffer, BufferUsages, Device, Queue};

/// Create a buffer initialized with the given data.
pub fn create_buffer_init<T: bytemuck::Pod>(
    device: &Device,
    label: &str,
    data: &[T],
    usage: BufferUsages,
) -> Buffer {
    use wgpu::util::DeviceExt;

    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage,
    })
}

/// Create an uninitialized buffer of `size` bytes.
pub fn create_buffer(device: &Device, label: &str, size: u64, usage: BufferUsages) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

/// Create a zero-initialized buffer holding `count` elements of `T`.
///
/// Counters and histograms must start from zero; buffers created with
/// `mapped_at_creation: false` contain garbage until first written.
pub fn create_buffer_zeroed<T: bytemuck::Pod>(
    device: &Device,
    label: &str,
    count: usize,
    usage: BufferUsages,
) -> Buffer {
    use wgpu::util::DeviceExt;

    let data = vec![T::zeroed(); count];
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&data),
        usage,
    })
}

/// Read `count` elements of `T` back from a GPU buffer.
///
/// Copies through a staging buffer, maps it, and blocks on the device until
/// the map completes. The source buffer needs `COPY_SRC` usage.
pub async fn read_buffer<T: bytemuck::Pod>(
    device: &Device,
    queue: &Queue,
    buffer: &Buffer,
    count: usize,
) -> Result<Vec<T>, GpuError> {
    let size = (count * std::mem::size_of::<T>()) as u64;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback staging"),
        size,
        usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback encoder"),
    });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
    queue.submit(Some(encoder.finish()));

    let (tx, rx) = futures::channel::oneshot::channel();
    staging
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
    device.poll(wgpu::Maintain::Wait);

    rx.await.map_err(|_| GpuError::ReadbackLost)??;

    let data = staging.slice(..).get_mapped_range();
    let result: Vec<T> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging.unmap();

    Ok(result)
}

/// Blocking wrapper for [`read_buffer`].
pub fn read_buffer_blocking<T: bytemuck::Pod>(
    device: &Device,
    queue: &Queue,
    buffer: &Buffer,
    count: usize,
) -> Result<Vec<T>, GpuError> {
    pollster::block_on(read_buffer(device, queue, buffer, count))
}
