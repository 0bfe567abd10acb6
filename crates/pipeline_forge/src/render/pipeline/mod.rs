//! Pipeline management for a named set of graphics pipelines
//!
//! Descriptors (built by hand or loaded from a [`PipelineSetConfig`]) are
//! turned into pipelines and vertex buffers by the [`PipelineManager`], which
//! also records the per-frame bindings.

pub mod fixed_function;
pub mod pipeline_config;
pub mod pipeline_manager;

pub use fixed_function::{pipeline_desc_for, PipelineTargets};
pub use pipeline_config::{PipelineDescriptor, PipelineEntryConfig, PipelineSetConfig, Topology};
pub use pipeline_manager::{BufferPair, PipelineManager};
