//! # Rendering
//!
//! - **Vulkan backend**: device seam, buffers, transfer queue, shaders and vertex layouts
//! - **Pipelines**: the named pipeline registry built on top of it

pub mod pipeline;
pub mod vulkan;

pub use pipeline::{BufferPair, PipelineDescriptor, PipelineManager, Topology};
pub use vulkan::{AshDevice, GpuDevice, VulkanError, VulkanResult};
