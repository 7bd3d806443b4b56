//! GPU context management - wgpu device and queue initialization.

use thiserror::Error;
use wgpu::{
    Device, DeviceDescriptor, Features, Instance, Limits, Queue, RequestAdapterOptions,
};

/// GPU-level failures: initialization, device loss, readback.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("readback channel closed before the map completed")]
    ReadbackLost,

    #[error("viewport produces {num_tiles} tiles, more than the supported {max_tiles}")]
    ViewportTooLarge { num_tiles: u32, max_tiles: u32 },
}

pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
}

impl GpuContext {
    /// Initialize GPU context asynchronously.
    ///
    /// Selects a high-performance adapter and creates a device with default
    /// features; every shader in this crate stays inside the base WebGPU
    /// limits.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("isosplat device"),
                    required_features: Features::empty(),
                    required_limits: Limits::default(),
                },
                None,
            )
            .await?;

        Ok(Self { device, queue })
    }

    /// Synchronous wrapper using pollster.
    ///
    /// This blocks the current thread until GPU initialization completes.
    pub fn new_blocking() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }
}
