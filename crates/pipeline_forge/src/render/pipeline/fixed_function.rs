//! Fixed-function state derived from a pipeline descriptor
//!
//! Kept free of device calls so the state every pipeline receives can be
//! checked without a GPU.

use ash::vk;

use super::pipeline_config::{PipelineDescriptor, Topology};
use crate::render::vulkan::GraphicsPipelineDesc;

/// Static line width baked into line-strip pipelines
pub const LINE_STRIP_LINE_WIDTH: f32 = 5.0;

/// Line width of every other topology
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Line width set per frame when line-strip pipelines are bound
pub const RECORDED_LINE_WIDTH: f32 = 1.0;

/// Handles a pipeline is built against, besides its own descriptor
#[derive(Debug, Clone, Copy)]
pub struct PipelineTargets {
    /// Compiled vertex stage
    pub vertex_shader: vk::ShaderModule,
    /// Compiled fragment stage
    pub fragment_shader: vk::ShaderModule,
    /// Shared pipeline layout
    pub layout: vk::PipelineLayout,
    /// Render pass with a single color attachment
    pub render_pass: vk::RenderPass,
}

/// Resolve the full pipeline state for one descriptor
///
/// Line strips rasterize in line mode with a 5.0 static width and a dynamic
/// line width; every other topology fills polygons at width 1.0 with no
/// dynamic state.
pub fn pipeline_desc_for(descriptor: &PipelineDescriptor, targets: PipelineTargets) -> GraphicsPipelineDesc {
    let (vertex_bindings, vertex_attributes) = match &descriptor.vertex_layout {
        Some(layout) => (vec![layout.binding_description()], layout.attribute_descriptions()),
        None => (Vec::new(), Vec::new()),
    };

    let extent = descriptor.extent;
    let viewport = vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    };
    let scissor = vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    };

    let (polygon_mode, line_width, dynamic_states) = if descriptor.topology == Topology::LineStrip {
        (
            vk::PolygonMode::LINE,
            LINE_STRIP_LINE_WIDTH,
            vec![vk::DynamicState::LINE_WIDTH],
        )
    } else {
        (vk::PolygonMode::FILL, DEFAULT_LINE_WIDTH, Vec::new())
    };

    GraphicsPipelineDesc {
        vertex_shader: targets.vertex_shader,
        fragment_shader: targets.fragment_shader,
        vertex_bindings,
        vertex_attributes,
        topology: descriptor.topology.to_vk(),
        viewport,
        scissor,
        polygon_mode,
        line_width,
        cull_mode: vk::CullModeFlags::BACK,
        front_face: vk::FrontFace::CLOCKWISE,
        color_write_mask: vk::ColorComponentFlags::RGBA,
        dynamic_states,
        layout: targets.layout,
        render_pass: targets.render_pass,
        subpass: 0,
    }
}
