//! # Pipeline Forge
//!
//! Named Vulkan graphics pipelines with their vertex buffers, built on `ash`.
//!
//! ## Features
//!
//! - **Pipeline registry**: create pipelines from descriptors or a TOML/RON pipeline set
//! - **Vertex buffers**: staging and device-local buffer pairs with explicit memory-type selection
//! - **Transfer queue uploads**: synchronous one-shot copies on a dedicated transfer family
//! - **Frame bindings**: pipelines, vertex buffers and dynamic line width recorded in name order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipeline_forge::prelude::*;
//!
//! fn build(
//!     device: &AshDevice,
//!     render_pass: ash::vk::RenderPass,
//!     extent: ash::vk::Extent2D,
//!     families: QueueFamilyIndices,
//! ) -> Result<PipelineManager<AshDevice>, Box<dyn std::error::Error>> {
//!     let set = PipelineSetConfig::load_from_file("resources/pipelines.toml")?;
//!     let descriptors = set.to_descriptors(extent, &VertexLayoutRegistry::with_builtin())?;
//!
//!     let mut manager = PipelineManager::new(device, render_pass, families)?;
//!     manager.create_pipelines(&descriptors)?;
//!     manager.upload_vertices("circle", &[53i32])?;
//!     Ok(manager)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        render::{
            pipeline::{
                BufferPair, PipelineDescriptor, PipelineEntryConfig, PipelineManager, PipelineSetConfig,
                Topology,
            },
            vulkan::{
                AshDevice, GpuDevice, InterleavedLayout, QueueFamilyIndices, SegmentCountLayout, VertexLayout,
                VertexLayoutRegistry, VulkanError, VulkanResult,
            },
        },
    };
}
