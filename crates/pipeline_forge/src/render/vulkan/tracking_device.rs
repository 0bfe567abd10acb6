//! Resource-tracking stand-in for a GPU device
//!
//! Implements [`GpuDevice`] entirely in host memory. Every handle it hands out
//! is unique, every allocation is backed by a byte vector, copies recorded in
//! a command buffer execute when that buffer is submitted, and any call that
//! touches a handle which is not alive is logged as a violation instead of
//! crashing. Tests assert on the violation list, the live counts and the
//! recorded command streams.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::device::{BufferDesc, GpuDevice, GraphicsPipelineDesc};

/// A command captured from a command buffer
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// `cmd_bind_pipeline`
    BindPipeline(vk::PipelineBindPoint, vk::Pipeline),
    /// `cmd_bind_vertex_buffers`
    BindVertexBuffers {
        /// First binding slot
        first_binding: u32,
        /// Bound buffers
        buffers: Vec<vk::Buffer>,
        /// Per-buffer offsets
        offsets: Vec<vk::DeviceSize>,
    },
    /// `cmd_set_line_width`
    SetLineWidth(f32),
    /// `cmd_copy_buffer`
    CopyBuffer {
        /// Source buffer
        src: vk::Buffer,
        /// Destination buffer
        dst: vk::Buffer,
        /// Read offset in `src`
        src_offset: vk::DeviceSize,
        /// Write offset in `dst`
        dst_offset: vk::DeviceSize,
        /// Bytes copied
        size: vk::DeviceSize,
    },
}

struct TrackedBuffer {
    desc: BufferDesc,
    memory: Option<vk::DeviceMemory>,
}

#[derive(Default)]
struct CommandBufferState {
    pool: Option<vk::CommandPool>,
    begin_flags: Option<vk::CommandBufferUsageFlags>,
    recording: bool,
    commands: Vec<RecordedCommand>,
}

#[derive(Default)]
struct TrackingState {
    next_handle: u64,
    memory_types: Vec<vk::MemoryPropertyFlags>,
    buffers: HashMap<u64, TrackedBuffer>,
    memories: HashMap<u64, Vec<u8>>,
    shader_modules: HashSet<u64>,
    layouts: HashSet<u64>,
    pipelines: HashMap<u64, GraphicsPipelineDesc>,
    pools: HashMap<u64, u32>,
    command_buffers: HashMap<u64, CommandBufferState>,
    submissions: Vec<(vk::Queue, vk::CommandBuffer)>,
    destroyed_buffers: usize,
    freed_memories: usize,
    destroyed_pipelines: usize,
    destroyed_shader_modules: usize,
    pipelines_created: usize,
    fail_pipeline_at: Option<usize>,
    fail_memory_allocation: Option<vk::Result>,
    violations: Vec<String>,
}

impl TrackingState {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    fn recording_buffer(&mut self, command_buffer: vk::CommandBuffer) -> &mut CommandBufferState {
        self.command_buffers.entry(command_buffer.as_raw()).or_default()
    }

    /// Flags a dead buffer, or a live one whose bound memory was freed
    fn check_buffer(&mut self, what: &str, buffer: vk::Buffer) {
        let bound = match self.buffers.get(&buffer.as_raw()) {
            Some(tracked) => tracked.memory,
            None => {
                self.violation(format!("{what}: buffer {:#x} is not alive", buffer.as_raw()));
                return;
            }
        };
        if let Some(memory) = bound {
            if !self.memories.contains_key(&memory.as_raw()) {
                self.violation(format!(
                    "{what}: buffer {:#x} is bound to freed memory {:#x}",
                    buffer.as_raw(),
                    memory.as_raw()
                ));
            }
        }
    }

    /// Bit mask with one bit per memory type
    fn memory_type_bits(&self) -> u32 {
        match self.memory_types.len() {
            0 => 0,
            len => u32::MAX >> (32 - len),
        }
    }
}

/// In-memory [`GpuDevice`] that records what is done to it
#[derive(Clone)]
pub struct TrackingDevice {
    state: Rc<RefCell<TrackingState>>,
}

impl TrackingDevice {
    /// Device with one device-local and one host-visible coherent memory type
    pub fn new() -> Self {
        Self::with_memory_types(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ])
    }

    /// Device with a custom memory type table
    ///
    /// Entries past `vk::MAX_MEMORY_TYPES` are ignored.
    pub fn with_memory_types(types: &[vk::MemoryPropertyFlags]) -> Self {
        let state = TrackingState {
            memory_types: types.iter().copied().take(vk::MAX_MEMORY_TYPES).collect(),
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Make the `index`-th pipeline creation (zero-based) fail
    pub fn fail_pipeline_creation_at(&self, index: usize) {
        self.state.borrow_mut().fail_pipeline_at = Some(index);
    }

    /// Make every memory allocation fail with `result`
    pub fn fail_memory_allocation(&self, result: vk::Result) {
        self.state.borrow_mut().fail_memory_allocation = Some(result);
    }

    /// Use-after-free, double-free and misuse reports
    pub fn violations(&self) -> Vec<String> {
        self.state.borrow().violations.clone()
    }

    /// Buffers not yet destroyed
    pub fn live_buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Allocations not yet freed
    pub fn live_memory_count(&self) -> usize {
        self.state.borrow().memories.len()
    }

    /// Pipelines not yet destroyed
    pub fn live_pipeline_count(&self) -> usize {
        self.state.borrow().pipelines.len()
    }

    /// Shader modules not yet destroyed
    pub fn live_shader_module_count(&self) -> usize {
        self.state.borrow().shader_modules.len()
    }

    /// Pipeline layouts not yet destroyed
    pub fn live_layout_count(&self) -> usize {
        self.state.borrow().layouts.len()
    }

    /// Command pools not yet destroyed
    pub fn live_pool_count(&self) -> usize {
        self.state.borrow().pools.len()
    }

    /// Allocated command buffers not yet freed
    pub fn live_command_buffer_count(&self) -> usize {
        self.state
            .borrow()
            .command_buffers
            .values()
            .filter(|cb| cb.pool.is_some())
            .count()
    }

    /// Total buffers destroyed so far
    pub fn destroyed_buffer_count(&self) -> usize {
        self.state.borrow().destroyed_buffers
    }

    /// Total allocations freed so far
    pub fn freed_memory_count(&self) -> usize {
        self.state.borrow().freed_memories
    }

    /// Total pipelines destroyed so far
    pub fn destroyed_pipeline_count(&self) -> usize {
        self.state.borrow().destroyed_pipelines
    }

    /// Total shader modules destroyed so far
    pub fn destroyed_shader_module_count(&self) -> usize {
        self.state.borrow().destroyed_shader_modules
    }

    /// Creation parameters of a live buffer
    pub fn buffer_desc(&self, buffer: vk::Buffer) -> Option<BufferDesc> {
        self.state
            .borrow()
            .buffers
            .get(&buffer.as_raw())
            .map(|tracked| tracked.desc.clone())
    }

    /// Memory bound to a live buffer
    pub fn bound_memory(&self, buffer: vk::Buffer) -> Option<vk::DeviceMemory> {
        self.state
            .borrow()
            .buffers
            .get(&buffer.as_raw())
            .and_then(|tracked| tracked.memory)
    }

    /// Host view of an allocation, device-local or not
    pub fn memory_contents(&self, memory: vk::DeviceMemory) -> Option<Vec<u8>> {
        self.state.borrow().memories.get(&memory.as_raw()).cloned()
    }

    /// Creation parameters of a live pipeline
    pub fn pipeline_desc(&self, pipeline: vk::Pipeline) -> Option<GraphicsPipelineDesc> {
        self.state.borrow().pipelines.get(&pipeline.as_raw()).cloned()
    }

    /// Commands recorded into a command buffer
    pub fn recorded_commands(&self, command_buffer: vk::CommandBuffer) -> Vec<RecordedCommand> {
        self.state
            .borrow()
            .command_buffers
            .get(&command_buffer.as_raw())
            .map(|cb| cb.commands.clone())
            .unwrap_or_default()
    }

    /// Usage flags a command buffer was begun with
    pub fn begin_flags(&self, command_buffer: vk::CommandBuffer) -> Option<vk::CommandBufferUsageFlags> {
        self.state
            .borrow()
            .command_buffers
            .get(&command_buffer.as_raw())
            .and_then(|cb| cb.begin_flags)
    }

    /// Every submission in order
    pub fn submissions(&self) -> Vec<(vk::Queue, vk::CommandBuffer)> {
        self.state.borrow().submissions.clone()
    }
}

impl Default for TrackingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuDevice for TrackingDevice {
    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        let state = self.state.borrow();
        let mut properties = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: state.memory_types.len() as u32,
            ..Default::default()
        };
        for (i, flags) in state.memory_types.iter().enumerate() {
            properties.memory_types[i] = vk::MemoryType {
                property_flags: *flags,
                heap_index: 0,
            };
        }
        properties
    }

    fn create_buffer(&self, desc: &BufferDesc) -> VkResult<vk::Buffer> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if desc.size == 0 {
            state.violation("create_buffer: zero-sized buffer".to_string());
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        if desc.sharing_mode == vk::SharingMode::EXCLUSIVE && !desc.queue_family_indices.is_empty() {
            state.violation("create_buffer: exclusive buffer with a family list".to_string());
        }
        let raw = state.next();
        state.buffers.insert(
            raw,
            TrackedBuffer {
                desc: desc.clone(),
                memory: None,
            },
        );
        Ok(vk::Buffer::from_raw(raw))
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.check_buffer("buffer_memory_requirements", buffer);
        let size = state
            .buffers
            .get(&buffer.as_raw())
            .map_or(0, |tracked| tracked.desc.size);
        vk::MemoryRequirements {
            size,
            alignment: 4,
            memory_type_bits: state.memory_type_bits(),
        }
    }

    fn allocate_memory(&self, size: vk::DeviceSize, memory_type_index: u32) -> VkResult<vk::DeviceMemory> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Some(result) = state.fail_memory_allocation {
            return Err(result);
        }
        if memory_type_index as usize >= state.memory_types.len() {
            state.violation(format!("allocate_memory: memory type {memory_type_index} does not exist"));
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        let raw = state.next();
        state.memories.insert(raw, vec![0; size as usize]);
        Ok(vk::DeviceMemory::from_raw(raw))
    }

    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.memories.contains_key(&memory.as_raw()) {
            state.violation(format!("bind_buffer_memory: memory {:#x} is not alive", memory.as_raw()));
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        let bound = state.buffers.get(&buffer.as_raw()).map(|tracked| tracked.memory.is_some());
        match bound {
            Some(false) => {
                if let Some(tracked) = state.buffers.get_mut(&buffer.as_raw()) {
                    tracked.memory = Some(memory);
                }
                Ok(())
            }
            Some(true) => {
                state.violation("bind_buffer_memory: buffer already bound".to_string());
                Err(vk::Result::ERROR_UNKNOWN)
            }
            None => {
                state.check_buffer("bind_buffer_memory", buffer);
                Err(vk::Result::ERROR_UNKNOWN)
            }
        }
    }

    fn write_mapped_memory(&self, memory: vk::DeviceMemory, data: &[u8]) -> VkResult<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let capacity = state.memories.get(&memory.as_raw()).map(Vec::len);
        match capacity {
            Some(len) if len >= data.len() => {
                if let Some(bytes) = state.memories.get_mut(&memory.as_raw()) {
                    bytes[..data.len()].copy_from_slice(data);
                }
                Ok(())
            }
            Some(_) => {
                state.violation("write_mapped_memory: write past end of allocation".to_string());
                Err(vk::Result::ERROR_MEMORY_MAP_FAILED)
            }
            None => {
                state.violation(format!("write_mapped_memory: memory {:#x} is not alive", memory.as_raw()));
                Err(vk::Result::ERROR_MEMORY_MAP_FAILED)
            }
        }
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.buffers.remove(&buffer.as_raw()).is_some() {
            state.destroyed_buffers += 1;
        } else {
            state.violation(format!("destroy_buffer: double free of {:#x}", buffer.as_raw()));
        }
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let still_bound = state
            .buffers
            .iter()
            .find(|(_, tracked)| tracked.memory == Some(memory))
            .map(|(raw, _)| *raw);
        if let Some(buffer) = still_bound {
            state.violation(format!(
                "free_memory: {:#x} is still bound to live buffer {:#x}",
                memory.as_raw(),
                buffer
            ));
        }
        if state.memories.remove(&memory.as_raw()).is_some() {
            state.freed_memories += 1;
        } else {
            state.violation(format!("free_memory: double free of {:#x}", memory.as_raw()));
        }
    }

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if code.first() != Some(&0x0723_0203) {
            return Err(vk::Result::ERROR_INVALID_SHADER_NV);
        }
        let raw = state.next();
        state.shader_modules.insert(raw);
        Ok(vk::ShaderModule::from_raw(raw))
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.shader_modules.remove(&module.as_raw()) {
            state.destroyed_shader_modules += 1;
        } else {
            state.violation(format!("destroy_shader_module: double free of {:#x}", module.as_raw()));
        }
    }

    fn create_pipeline_layout(&self) -> VkResult<vk::PipelineLayout> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let raw = state.next();
        state.layouts.insert(raw);
        Ok(vk::PipelineLayout::from_raw(raw))
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.layouts.remove(&layout.as_raw()) {
            state.violation(format!("destroy_pipeline_layout: double free of {:#x}", layout.as_raw()));
        }
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> VkResult<vk::Pipeline> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let attempt = state.pipelines_created;
        state.pipelines_created += 1;
        if state.fail_pipeline_at == Some(attempt) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        for module in [desc.vertex_shader, desc.fragment_shader] {
            if !state.shader_modules.contains(&module.as_raw()) {
                state.violation(format!("create_graphics_pipeline: shader module {:#x} is not alive", module.as_raw()));
            }
        }
        if !state.layouts.contains(&desc.layout.as_raw()) {
            state.violation("create_graphics_pipeline: layout is not alive".to_string());
        }
        let raw = state.next();
        state.pipelines.insert(raw, desc.clone());
        Ok(vk::Pipeline::from_raw(raw))
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.pipelines.remove(&pipeline.as_raw()).is_some() {
            state.destroyed_pipelines += 1;
        } else {
            state.violation(format!("destroy_pipeline: double free of {:#x}", pipeline.as_raw()));
        }
    }

    fn create_command_pool(&self, queue_family_index: u32) -> VkResult<vk::CommandPool> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let raw = state.next();
        state.pools.insert(raw, queue_family_index);
        Ok(vk::CommandPool::from_raw(raw))
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.pools.remove(&pool.as_raw()).is_none() {
            state.violation(format!("destroy_command_pool: double free of {:#x}", pool.as_raw()));
        }
        state
            .command_buffers
            .retain(|_, cb| cb.pool != Some(pool));
    }

    fn device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        vk::Queue::from_raw(0x5100_0000 | (u64::from(queue_family_index) << 8) | u64::from(queue_index))
    }

    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.pools.contains_key(&pool.as_raw()) {
            state.violation("allocate_command_buffer: pool is not alive".to_string());
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        let raw = state.next();
        state.command_buffers.insert(
            raw,
            CommandBufferState {
                pool: Some(pool),
                ..Default::default()
            },
        );
        Ok(vk::CommandBuffer::from_raw(raw))
    }

    fn free_command_buffer(&self, pool: vk::CommandPool, command_buffer: vk::CommandBuffer) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let owned = state
            .command_buffers
            .get(&command_buffer.as_raw())
            .is_some_and(|cb| cb.pool == Some(pool));
        if owned {
            if let Some(cb) = state.command_buffers.get_mut(&command_buffer.as_raw()) {
                cb.pool = None;
            }
        } else {
            state.violation(format!("free_command_buffer: {:#x} not allocated from pool", command_buffer.as_raw()));
        }
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags) -> VkResult<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let cb = state.recording_buffer(command_buffer);
        if cb.recording {
            state.violation("begin_command_buffer: already recording".to_string());
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        cb.recording = true;
        cb.begin_flags = Some(flags);
        Ok(())
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let cb = state.recording_buffer(command_buffer);
        if !cb.recording {
            state.violation("end_command_buffer: not recording".to_string());
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        cb.recording = false;
        Ok(())
    }

    fn queue_submit(&self, queue: vk::Queue, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.submissions.push((queue, command_buffer));

        let recorded = state
            .command_buffers
            .get(&command_buffer.as_raw())
            .map(|cb| (cb.recording, cb.commands.clone()));
        let commands = match recorded {
            Some((false, commands)) => commands,
            Some((true, _)) => {
                state.violation("queue_submit: command buffer still recording".to_string());
                return Err(vk::Result::ERROR_UNKNOWN);
            }
            None => {
                state.violation("queue_submit: unknown command buffer".to_string());
                return Err(vk::Result::ERROR_UNKNOWN);
            }
        };

        for command in commands {
            if let RecordedCommand::CopyBuffer {
                src,
                dst,
                src_offset,
                dst_offset,
                size,
            } = command
            {
                let src_memory = state.buffers.get(&src.as_raw()).and_then(|b| b.memory);
                let dst_memory = state.buffers.get(&dst.as_raw()).and_then(|b| b.memory);
                let (Some(src_memory), Some(dst_memory)) = (src_memory, dst_memory) else {
                    state.violation("queue_submit: copy between unbound or dead buffers".to_string());
                    return Err(vk::Result::ERROR_DEVICE_LOST);
                };

                let src_start = src_offset as usize;
                let dst_start = dst_offset as usize;
                let len = size as usize;
                let Some(bytes) = state
                    .memories
                    .get(&src_memory.as_raw())
                    .and_then(|m| m.get(src_start..src_start + len))
                    .map(<[u8]>::to_vec)
                else {
                    state.violation("queue_submit: copy reads past source allocation".to_string());
                    return Err(vk::Result::ERROR_DEVICE_LOST);
                };
                match state
                    .memories
                    .get_mut(&dst_memory.as_raw())
                    .and_then(|m| m.get_mut(dst_start..dst_start + len))
                {
                    Some(target) => target.copy_from_slice(&bytes),
                    None => {
                        state.violation("queue_submit: copy writes past destination allocation".to_string());
                        return Err(vk::Result::ERROR_DEVICE_LOST);
                    }
                }
            }
        }
        Ok(())
    }

    fn queue_wait_idle(&self, _queue: vk::Queue) -> VkResult<()> {
        Ok(())
    }

    fn cmd_copy_buffer(&self, command_buffer: vk::CommandBuffer, src: vk::Buffer, dst: vk::Buffer, region: vk::BufferCopy) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.check_buffer("cmd_copy_buffer", src);
        state.check_buffer("cmd_copy_buffer", dst);
        state
            .recording_buffer(command_buffer)
            .commands
            .push(RecordedCommand::CopyBuffer {
                src,
                dst,
                src_offset: region.src_offset,
                dst_offset: region.dst_offset,
                size: region.size,
            });
    }

    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.pipelines.contains_key(&pipeline.as_raw()) {
            state.violation(format!("cmd_bind_pipeline: pipeline {:#x} is not alive", pipeline.as_raw()));
        }
        state
            .recording_buffer(command_buffer)
            .commands
            .push(RecordedCommand::BindPipeline(bind_point, pipeline));
    }

    fn cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[vk::DeviceSize],
    ) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        for &buffer in buffers {
            state.check_buffer("cmd_bind_vertex_buffers", buffer);
        }
        state
            .recording_buffer(command_buffer)
            .commands
            .push(RecordedCommand::BindVertexBuffers {
                first_binding,
                buffers: buffers.to_vec(),
                offsets: offsets.to_vec(),
            });
    }

    fn cmd_set_line_width(&self, command_buffer: vk::CommandBuffer, line_width: f32) {
        self.state
            .borrow_mut()
            .recording_buffer(command_buffer)
            .commands
            .push(RecordedCommand::SetLineWidth(line_width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_buffer(device: &TrackingDevice) -> (vk::Buffer, vk::DeviceMemory) {
        let buffer = device
            .create_buffer(&BufferDesc {
                size: 16,
                usage: vk::BufferUsageFlags::VERTEX_BUFFER,
                sharing_mode: vk::SharingMode::EXCLUSIVE,
                queue_family_indices: Vec::new(),
            })
            .unwrap();
        let memory = device.allocate_memory(16, 0).unwrap();
        device.bind_buffer_memory(buffer, memory).unwrap();
        (buffer, memory)
    }

    #[test]
    fn test_freeing_bound_memory_is_flagged() {
        let device = TrackingDevice::new();
        let (buffer, memory) = bound_buffer(&device);

        device.free_memory(memory);
        device.destroy_buffer(buffer);

        let violations = device.violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("still bound"));
    }

    #[test]
    fn test_using_buffer_with_freed_memory_is_flagged() {
        let device = TrackingDevice::new();
        let (buffer, memory) = bound_buffer(&device);
        device.free_memory(memory);

        device.cmd_bind_vertex_buffers(vk::CommandBuffer::from_raw(0xC0DE), 0, &[buffer], &[0]);
        assert!(device
            .violations()
            .iter()
            .any(|v| v.contains("bound to freed memory")));
    }

    #[test]
    fn test_destroy_then_free_is_clean() {
        let device = TrackingDevice::new();
        let (buffer, memory) = bound_buffer(&device);

        device.destroy_buffer(buffer);
        device.free_memory(memory);
        assert!(device.violations().is_empty());
    }

    #[test]
    fn test_full_memory_table_mask() {
        let device = TrackingDevice::with_memory_types(&[vk::MemoryPropertyFlags::DEVICE_LOCAL; 40]);
        assert_eq!(device.memory_properties().memory_type_count, 32);

        let (buffer, _) = bound_buffer(&device);
        assert_eq!(device.buffer_memory_requirements(buffer).memory_type_bits, u32::MAX);
    }
}
