//! Device capability trait
//!
//! The pipeline manager never talks to a driver directly. It goes through
//! [`GpuDevice`], which exposes exactly the device, queue and memory
//! operations the manager needs. [`AshDevice`](super::AshDevice) implements it
//! on top of `ash`; tests substitute a resource-tracking double.
//!
//! Create-info structures cross the trait as plain owned descriptors instead
//! of raw `vk::*CreateInfo` values, so implementations never chase pointers.

use ash::prelude::VkResult;
use ash::vk;

/// Parameters for creating a buffer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: vk::DeviceSize,
    /// How the buffer will be used
    pub usage: vk::BufferUsageFlags,
    /// Exclusive or concurrent queue-family access
    pub sharing_mode: vk::SharingMode,
    /// Families attached to the buffer; empty for exclusive buffers
    pub queue_family_indices: Vec<u32>,
}

/// Fully resolved state for one graphics pipeline
///
/// Viewport and scissor are baked in; the only state that may be dynamic is
/// the line width.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDesc {
    /// Compiled vertex stage
    pub vertex_shader: vk::ShaderModule,
    /// Compiled fragment stage
    pub fragment_shader: vk::ShaderModule,
    /// Vertex input bindings (zero or one)
    pub vertex_bindings: Vec<vk::VertexInputBindingDescription>,
    /// Vertex input attributes
    pub vertex_attributes: Vec<vk::VertexInputAttributeDescription>,
    /// Primitive topology, never with primitive restart
    pub topology: vk::PrimitiveTopology,
    /// Static viewport
    pub viewport: vk::Viewport,
    /// Static scissor rectangle
    pub scissor: vk::Rect2D,
    /// Fill or line rasterization
    pub polygon_mode: vk::PolygonMode,
    /// Static line width
    pub line_width: f32,
    /// Face culling
    pub cull_mode: vk::CullModeFlags,
    /// Winding order of front faces
    pub front_face: vk::FrontFace,
    /// Color write mask of the single attachment; blending is always off
    pub color_write_mask: vk::ColorComponentFlags,
    /// States supplied at record time instead of at creation
    pub dynamic_states: Vec<vk::DynamicState>,
    /// Shared pipeline layout
    pub layout: vk::PipelineLayout,
    /// Render pass the pipeline is compatible with
    pub render_pass: vk::RenderPass,
    /// Subpass index inside the render pass
    pub subpass: u32,
}

impl GraphicsPipelineDesc {
    /// Whether line width is supplied per draw
    pub fn has_dynamic_line_width(&self) -> bool {
        self.dynamic_states.contains(&vk::DynamicState::LINE_WIDTH)
    }
}

/// Device, queue and memory operations consumed by the pipeline layer
///
/// Methods mirror the Vulkan entry points of the same name. Destroy and free
/// calls take ownership of the handle conceptually; callers never reuse a
/// handle after passing it to one of them.
pub trait GpuDevice {
    /// Memory type and heap table of the physical device
    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties;

    /// Create an unbound buffer
    fn create_buffer(&self, desc: &BufferDesc) -> VkResult<vk::Buffer>;

    /// Size, alignment and acceptable memory types for a buffer
    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements;

    /// Allocate device memory from one memory type
    fn allocate_memory(&self, size: vk::DeviceSize, memory_type_index: u32) -> VkResult<vk::DeviceMemory>;

    /// Bind memory to a buffer at offset 0
    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()>;

    /// Map host-visible memory, copy `data` to its start, then unmap
    fn write_mapped_memory(&self, memory: vk::DeviceMemory, data: &[u8]) -> VkResult<()>;

    /// Destroy a buffer
    fn destroy_buffer(&self, buffer: vk::Buffer);

    /// Free a memory allocation
    fn free_memory(&self, memory: vk::DeviceMemory);

    /// Create a shader module from SPIR-V words
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule>;

    /// Destroy a shader module
    fn destroy_shader_module(&self, module: vk::ShaderModule);

    /// Create a pipeline layout with no descriptor sets and no push constants
    fn create_pipeline_layout(&self) -> VkResult<vk::PipelineLayout>;

    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);

    /// Create one graphics pipeline
    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> VkResult<vk::Pipeline>;

    /// Destroy a pipeline
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);

    /// Create a command pool for one queue family
    fn create_command_pool(&self, queue_family_index: u32) -> VkResult<vk::CommandPool>;

    /// Destroy a command pool and every command buffer allocated from it
    fn destroy_command_pool(&self, pool: vk::CommandPool);

    /// Queue handle for a family and index
    fn device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue;

    /// Allocate one primary command buffer
    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer>;

    /// Return a command buffer to its pool
    fn free_command_buffer(&self, pool: vk::CommandPool, command_buffer: vk::CommandBuffer);

    /// Begin recording
    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags) -> VkResult<()>;

    /// End recording
    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    /// Submit one command buffer with no semaphores and no fence
    fn queue_submit(&self, queue: vk::Queue, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    /// Block until the queue has no pending work
    fn queue_wait_idle(&self, queue: vk::Queue) -> VkResult<()>;

    /// Record a buffer-to-buffer copy
    fn cmd_copy_buffer(&self, command_buffer: vk::CommandBuffer, src: vk::Buffer, dst: vk::Buffer, region: vk::BufferCopy);

    /// Record a pipeline bind
    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline);

    /// Record vertex buffer binds starting at `first_binding`
    fn cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[vk::DeviceSize],
    );

    /// Record a dynamic line width
    fn cmd_set_line_width(&self, command_buffer: vk::CommandBuffer, line_width: f32);
}
