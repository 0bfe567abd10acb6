//! Vertex input layouts
//!
//! A pipeline may declare one vertex layout: the binding description, the
//! attribute list and the byte size of the payload uploaded for it. Layouts
//! are trait objects so each shape of vertex data brings its own
//! implementation, and they can be looked up by name when pipelines are
//! declared in configuration files.

use ash::vk;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Description of one pipeline's vertex input
pub trait VertexLayout: Debug + Send + Sync {
    /// Binding description for binding 0
    fn binding_description(&self) -> vk::VertexInputBindingDescription;

    /// Attribute descriptions read from binding 0
    fn attribute_descriptions(&self) -> Vec<vk::VertexInputAttributeDescription>;

    /// Size in bytes of the vertex payload uploaded for this layout
    fn data_size(&self) -> vk::DeviceSize;
}

/// A single signed 32-bit integer shared by every vertex
///
/// The stride is zero, so every vertex of a draw reads the same value. The
/// circle pipeline uses it to pass its segment count and derives positions
/// from the vertex index in the shader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentCountLayout;

impl VertexLayout for SegmentCountLayout {
    fn binding_description(&self) -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: 0,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    fn attribute_descriptions(&self) -> Vec<vk::VertexInputAttributeDescription> {
        vec![vk::VertexInputAttributeDescription {
            binding: 0,
            location: 0,
            format: vk::Format::R32_SINT,
            offset: 0,
        }]
    }

    fn data_size(&self) -> vk::DeviceSize {
        std::mem::size_of::<i32>() as vk::DeviceSize
    }
}

/// Tightly packed per-vertex attributes
///
/// Attributes occupy consecutive locations starting at 0 and consecutive
/// offsets in declaration order; the stride is their summed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedLayout {
    formats: Vec<vk::Format>,
    vertex_count: u32,
}

impl InterleavedLayout {
    /// Create a layout for `vertex_count` vertices of the given attributes
    ///
    /// Returns `None` if any format is not a 32-bit scalar or vector format.
    pub fn new(formats: &[vk::Format], vertex_count: u32) -> Option<Self> {
        if formats.iter().any(|format| format_size(*format).is_none()) {
            return None;
        }
        Some(Self {
            formats: formats.to_vec(),
            vertex_count,
        })
    }

    /// Number of vertices the payload holds
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn stride(&self) -> u32 {
        self.formats.iter().filter_map(|f| format_size(*f)).sum()
    }
}

impl VertexLayout for InterleavedLayout {
    fn binding_description(&self) -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: self.stride(),
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    fn attribute_descriptions(&self) -> Vec<vk::VertexInputAttributeDescription> {
        let mut offset = 0;
        self.formats
            .iter()
            .zip(0u32..)
            .map(|(&format, location)| {
                let attribute = vk::VertexInputAttributeDescription {
                    binding: 0,
                    location,
                    format,
                    offset,
                };
                offset += format_size(format).unwrap_or(0);
                attribute
            })
            .collect()
    }

    fn data_size(&self) -> vk::DeviceSize {
        vk::DeviceSize::from(self.stride()) * vk::DeviceSize::from(self.vertex_count)
    }
}

/// Byte size of the 32-bit formats an interleaved layout accepts
fn format_size(format: vk::Format) -> Option<u32> {
    match format {
        vk::Format::R32_SFLOAT | vk::Format::R32_SINT | vk::Format::R32_UINT => Some(4),
        vk::Format::R32G32_SFLOAT | vk::Format::R32G32_SINT | vk::Format::R32G32_UINT => Some(8),
        vk::Format::R32G32B32_SFLOAT | vk::Format::R32G32B32_SINT | vk::Format::R32G32B32_UINT => Some(12),
        vk::Format::R32G32B32A32_SFLOAT
        | vk::Format::R32G32B32A32_SINT
        | vk::Format::R32G32B32A32_UINT => Some(16),
        _ => None,
    }
}

/// Vertex layouts registered by name
#[derive(Debug, Clone, Default)]
pub struct VertexLayoutRegistry {
    layouts: HashMap<String, Arc<dyn VertexLayout>>,
}

impl VertexLayoutRegistry {
    /// Name under which [`SegmentCountLayout`] is registered by default
    pub const SEGMENT_COUNT: &'static str = "segment_count";

    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in layouts
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Self::SEGMENT_COUNT, Arc::new(SegmentCountLayout));
        registry
    }

    /// Register or replace a layout
    pub fn register(&mut self, name: impl Into<String>, layout: Arc<dyn VertexLayout>) {
        self.layouts.insert(name.into(), layout);
    }

    /// Look up a layout by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn VertexLayout>> {
        self.layouts.get(name).cloned()
    }
}
