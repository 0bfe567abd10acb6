//! Pipeline descriptors and their file-backed configuration
//!
//! A [`PipelineDescriptor`] is everything the manager needs to build one
//! named pipeline. Descriptors can be written by hand or produced from a
//! [`PipelineSetConfig`] loaded from TOML or RON.

use ash::vk;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::render::vulkan::{VertexLayout, VertexLayoutRegistry};

/// Primitive topologies a pipeline can assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Independent points
    PointList,
    /// Independent line segments
    LineList,
    /// Connected line segments, rasterized as lines with dynamic width
    LineStrip,
    /// Independent triangles
    TriangleList,
    /// Connected triangle strip
    TriangleStrip,
    /// Triangles sharing the first vertex
    TriangleFan,
}

impl Topology {
    /// Matching Vulkan topology
    pub fn to_vk(self) -> vk::PrimitiveTopology {
        match self {
            Self::PointList => vk::PrimitiveTopology::POINT_LIST,
            Self::LineList => vk::PrimitiveTopology::LINE_LIST,
            Self::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
            Self::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
            Self::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
            Self::TriangleFan => vk::PrimitiveTopology::TRIANGLE_FAN,
        }
    }
}

/// Everything needed to build one named pipeline
#[derive(Debug, Clone)]
pub struct PipelineDescriptor {
    /// Registry key; unique for the manager's lifetime
    pub name: String,
    /// Primitive topology
    pub topology: Topology,
    /// Compiled vertex shader
    pub vertex_shader_path: PathBuf,
    /// Compiled fragment shader
    pub fragment_shader_path: PathBuf,
    /// Vertex input; pipelines without one get no vertex buffers
    pub vertex_layout: Option<Arc<dyn VertexLayout>>,
    /// Render target size the viewport and scissor cover
    pub extent: vk::Extent2D,
}

impl PipelineDescriptor {
    /// Descriptor with no vertex layout
    pub fn new(
        name: impl Into<String>,
        topology: Topology,
        vertex_shader_path: impl Into<PathBuf>,
        fragment_shader_path: impl Into<PathBuf>,
        extent: vk::Extent2D,
    ) -> Self {
        Self {
            name: name.into(),
            topology,
            vertex_shader_path: vertex_shader_path.into(),
            fragment_shader_path: fragment_shader_path.into(),
            vertex_layout: None,
            extent,
        }
    }

    /// Attach a vertex layout
    #[must_use]
    pub fn with_vertex_layout(mut self, layout: Arc<dyn VertexLayout>) -> Self {
        self.vertex_layout = Some(layout);
        self
    }

    /// Same descriptor aimed at a different render target size
    #[must_use]
    pub fn with_extent(mut self, extent: vk::Extent2D) -> Self {
        self.extent = extent;
        self
    }
}

/// One pipeline as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntryConfig {
    /// Pipeline name
    pub name: String,
    /// Primitive topology
    pub topology: Topology,
    /// Vertex shader path relative to `shader_dir`
    pub vertex_shader: String,
    /// Fragment shader path relative to `shader_dir`
    pub fragment_shader: String,
    /// Registered vertex layout name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_layout: Option<String>,
}

/// The statically declared set of pipelines an application creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSetConfig {
    /// Directory shader paths are resolved against
    #[serde(default = "default_shader_dir")]
    pub shader_dir: String,
    /// Pipelines in creation order
    #[serde(default)]
    pub pipelines: Vec<PipelineEntryConfig>,
}

fn default_shader_dir() -> String {
    "target/shaders".to_string()
}

impl Default for PipelineSetConfig {
    fn default() -> Self {
        Self {
            shader_dir: default_shader_dir(),
            pipelines: Vec::new(),
        }
    }
}

impl Config for PipelineSetConfig {}

impl PipelineSetConfig {
    /// Resolve the configured pipelines into descriptors for one render target
    pub fn to_descriptors(
        &self,
        extent: vk::Extent2D,
        layouts: &VertexLayoutRegistry,
    ) -> Result<Vec<PipelineDescriptor>, ConfigError> {
        let shader_dir = PathBuf::from(&self.shader_dir);

        self.pipelines
            .iter()
            .map(|entry| {
                let mut descriptor = PipelineDescriptor::new(
                    entry.name.clone(),
                    entry.topology,
                    shader_dir.join(&entry.vertex_shader),
                    shader_dir.join(&entry.fragment_shader),
                    extent,
                );
                if let Some(layout_name) = &entry.vertex_layout {
                    let layout = layouts.get(layout_name).ok_or_else(|| ConfigError::UnknownVertexLayout {
                        pipeline: entry.name.clone(),
                        layout: layout_name.clone(),
                    })?;
                    descriptor = descriptor.with_vertex_layout(layout);
                }
                Ok(descriptor)
            })
            .collect()
    }
}
