//! Vulkan rendering backend
//!
//! Low-level Vulkan wrappers the pipeline manager is built from. Every
//! wrapper owns its handle and releases it exactly once.

pub mod ash_device;
pub mod buffer;
pub mod commands;
pub mod device;
pub mod error;
pub mod queue_family;
pub mod shader;
pub mod vertex_layout;

#[cfg(test)]
pub(crate) mod tracking_device;

pub use ash_device::AshDevice;
pub use buffer::{find_memory_type, sharing_mode_for, AllocatedBuffer};
pub use commands::TransferChannel;
pub use device::{BufferDesc, GpuDevice, GraphicsPipelineDesc};
pub use error::{VulkanError, VulkanResult};
pub use queue_family::{is_graphics_family, is_transfer_family, QueueFamilyIndices};
pub use shader::{read_spirv_file, ShaderModule};
pub use vertex_layout::{InterleavedLayout, SegmentCountLayout, VertexLayout, VertexLayoutRegistry};
