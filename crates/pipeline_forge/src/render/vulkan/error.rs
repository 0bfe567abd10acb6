//! Vulkan error taxonomy
//!
//! Every failure in the pipeline and buffer layer is fatal to the operation
//! that raised it and is propagated to the caller unchanged. Nothing here
//! retries or degrades.

use ash::vk;
use std::path::PathBuf;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// A Vulkan object could not be created
    #[error("Failed to create {resource}: {result:?}")]
    ResourceCreation {
        /// Kind of resource that failed ("buffer", "graphics pipeline", ...)
        resource: &'static str,
        /// Status returned by the driver
        result: vk::Result,
    },

    /// A shader file is missing or unreadable
    #[error("Failed to read shader file {}: {source}", path.display())]
    FileAccess {
        /// Path that was requested
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// A shader file was read but does not hold a SPIR-V word stream
    #[error("Invalid SPIR-V bytecode in {}: {source}", path.display())]
    InvalidShaderBytecode {
        /// Path of the offending file
        path: PathBuf,
        /// Decoder failure
        #[source]
        source: std::io::Error,
    },

    /// No suitable memory type found for allocation
    #[error("No suitable memory type found (type filter {type_filter:#034b}, properties {properties:?})")]
    NoSuitableMemoryType {
        /// Memory type bits the buffer accepts
        type_filter: u32,
        /// Property flags that were required
        properties: vk::MemoryPropertyFlags,
    },

    /// A pipeline name was registered twice
    #[error("Pipeline '{name}' is already registered")]
    DuplicatePipeline {
        /// The conflicting name
        name: String,
    },

    /// No pipeline is registered under the given name
    #[error("Pipeline '{name}' is not registered")]
    UnknownPipeline {
        /// The requested name
        name: String,
    },

    /// Vertex data was sent to a pipeline that declared no vertex layout
    #[error("Pipeline '{name}' has no vertex buffer")]
    NoVertexBuffer {
        /// The requested name
        name: String,
    },

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },
}

impl VulkanError {
    /// Build a `map_err` adapter tagging a creation failure with its resource kind
    pub(crate) fn creating(resource: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::ResourceCreation { resource, result }
    }

    /// True for the usage-error family: the caller asked for something the
    /// registry cannot honour
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicatePipeline { .. }
                | Self::UnknownPipeline { .. }
                | Self::NoVertexBuffer { .. }
                | Self::InvalidOperation { .. }
        )
    }
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;
