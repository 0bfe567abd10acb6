//! Buffer allocation with explicit memory-type selection
//!
//! Memory management following RAII patterns: an [`AllocatedBuffer`] owns one
//! buffer object and the single allocation bound to it, and releases both
//! when dropped.

use ash::vk;

use super::device::{BufferDesc, GpuDevice};
use super::error::{VulkanError, VulkanResult};

/// Buffer object together with its bound memory
pub struct AllocatedBuffer<D: GpuDevice> {
    device: D,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
    properties: vk::MemoryPropertyFlags,
}

impl<D: GpuDevice + Clone> AllocatedBuffer<D> {
    /// Create a buffer, allocate matching memory and bind it
    ///
    /// `queue_families` lists every family that will touch the buffer.
    /// Duplicates are collapsed before the sharing mode is chosen. On failure
    /// nothing created here is left behind.
    pub fn new(
        device: &D,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
        queue_families: &[u32],
    ) -> VulkanResult<Self> {
        let (sharing_mode, queue_family_indices) = sharing_mode_for(queue_families);
        let buffer_desc = BufferDesc {
            size,
            usage,
            sharing_mode,
            queue_family_indices,
        };

        // Create buffer
        let buffer = device
            .create_buffer(&buffer_desc)
            .map_err(VulkanError::creating("buffer"))?;

        // Allocate and bind memory, releasing the buffer on failure
        let memory = match allocate_and_bind(device, buffer, properties) {
            Ok(memory) => memory,
            Err(err) => {
                device.destroy_buffer(buffer);
                return Err(err);
            }
        };

        log::debug!(
            "Allocated {} byte buffer ({:?}, {:?}, {:?})",
            size,
            usage,
            properties,
            buffer_desc.sharing_mode
        );

        Ok(Self {
            device: device.clone(),
            buffer,
            memory,
            size,
            properties,
        })
    }
}

impl<D: GpuDevice> AllocatedBuffer<D> {
    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Get memory handle
    pub fn memory(&self) -> vk::DeviceMemory {
        self.memory
    }

    /// Get size
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Memory properties the allocation was made with
    pub fn properties(&self) -> vk::MemoryPropertyFlags {
        self.properties
    }

    /// Write bytes to the start of the buffer through a host mapping
    ///
    /// Fails unless the memory is `HOST_VISIBLE`; device-local buffers are
    /// filled by transfer only.
    pub fn write_bytes(&self, data: &[u8]) -> VulkanResult<()> {
        if !self.properties.contains(vk::MemoryPropertyFlags::HOST_VISIBLE) {
            return Err(VulkanError::InvalidOperation {
                reason: format!("buffer memory is not host visible ({:?})", self.properties),
            });
        }
        if data.len() as vk::DeviceSize > self.size {
            return Err(VulkanError::InvalidOperation {
                reason: format!("{} bytes do not fit in a {} byte buffer", data.len(), self.size),
            });
        }
        self.device
            .write_mapped_memory(self.memory, data)
            .map_err(VulkanError::Api)
    }
}

impl<D: GpuDevice> Drop for AllocatedBuffer<D> {
    fn drop(&mut self) {
        self.device.destroy_buffer(self.buffer);
        self.device.free_memory(self.memory);
    }
}

/// Choose the sharing mode for a set of accessing queue families
///
/// Fewer than two distinct families gives exclusive access with no family
/// list; two or more gives concurrent access with the distinct families
/// attached in first-seen order.
pub fn sharing_mode_for(queue_families: &[u32]) -> (vk::SharingMode, Vec<u32>) {
    let mut distinct: Vec<u32> = Vec::with_capacity(queue_families.len());
    for &family in queue_families {
        if !distinct.contains(&family) {
            distinct.push(family);
        }
    }

    if distinct.len() < 2 {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    } else {
        (vk::SharingMode::CONCURRENT, distinct)
    }
}

/// Find memory type with required properties
///
/// Returns the lowest index allowed by `type_filter` whose property flags
/// contain all of `properties`.
pub fn find_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<u32> {
    let type_count = memory_properties
        .memory_type_count
        .min(vk::MAX_MEMORY_TYPES as u32);

    (0..type_count)
        .find(|&i| {
            type_filter & (1 << i) != 0
                && memory_properties.memory_types[i as usize]
                    .property_flags
                    .contains(properties)
        })
        .ok_or(VulkanError::NoSuitableMemoryType {
            type_filter,
            properties,
        })
}

fn allocate_and_bind<D: GpuDevice>(
    device: &D,
    buffer: vk::Buffer,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<vk::DeviceMemory> {
    // Find memory type
    let mem_requirements = device.buffer_memory_requirements(buffer);
    let memory_type_index = find_memory_type(
        &device.memory_properties(),
        mem_requirements.memory_type_bits,
        properties,
    )?;

    // Allocate memory
    let memory = device
        .allocate_memory(mem_requirements.size, memory_type_index)
        .map_err(VulkanError::creating("device memory"))?;

    // Bind buffer to memory
    if let Err(result) = device.bind_buffer_memory(buffer, memory) {
        device.free_memory(memory);
        return Err(VulkanError::Api(result));
    }

    Ok(memory)
}
