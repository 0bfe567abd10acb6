//! Transfer command submission
//!
//! One command pool bound to the transfer queue family, used only for
//! one-shot buffer copies. Every copy is recorded into a fresh primary
//! command buffer, submitted, waited on and freed before returning, so at
//! most one transfer is ever in flight.

use ash::vk;

use super::buffer::AllocatedBuffer;
use super::device::GpuDevice;
use super::error::{VulkanError, VulkanResult};

/// Dedicated pool and queue for synchronous host-to-device copies
pub struct TransferChannel<D: GpuDevice> {
    device: D,
    command_pool: vk::CommandPool,
    queue: vk::Queue,
}

impl<D: GpuDevice + Clone> TransferChannel<D> {
    /// Create the pool and fetch queue 0 of the transfer family
    pub fn new(device: &D, queue_family_index: u32) -> VulkanResult<Self> {
        let command_pool = device
            .create_command_pool(queue_family_index)
            .map_err(VulkanError::creating("command pool"))?;
        let queue = device.device_queue(queue_family_index, 0);

        log::debug!("Transfer channel ready on queue family {}", queue_family_index);

        Ok(Self {
            device: device.clone(),
            command_pool,
            queue,
        })
    }
}

impl<D: GpuDevice> TransferChannel<D> {
    /// Copy `size` bytes from the start of `src` to the start of `dst`
    ///
    /// Blocks until the transfer queue is idle. The command buffer is freed
    /// on every path, including failures after allocation.
    pub fn copy_buffer(&self, src: vk::Buffer, dst: vk::Buffer, size: vk::DeviceSize) -> VulkanResult<()> {
        let command_buffer = self
            .device
            .allocate_command_buffer(self.command_pool)
            .map_err(VulkanError::creating("command buffer"))?;

        let result = self.record_and_submit(command_buffer, src, dst, size);
        self.device
            .free_command_buffer(self.command_pool, command_buffer);
        result
    }

    /// Copy the whole of `src` into `dst`
    pub fn copy_allocated(&self, src: &AllocatedBuffer<D>, dst: &AllocatedBuffer<D>) -> VulkanResult<()> {
        if src.size() > dst.size() {
            return Err(VulkanError::InvalidOperation {
                reason: format!(
                    "cannot copy {} bytes into a {} byte buffer",
                    src.size(),
                    dst.size()
                ),
            });
        }
        self.copy_buffer(src.handle(), dst.handle(), src.size())
    }

    fn record_and_submit(
        &self,
        command_buffer: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Buffer,
        size: vk::DeviceSize,
    ) -> VulkanResult<()> {
        self.device
            .begin_command_buffer(command_buffer, vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)
            .map_err(VulkanError::Api)?;

        let copy_region = vk::BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size,
        };
        self.device
            .cmd_copy_buffer(command_buffer, src, dst, copy_region);

        self.device
            .end_command_buffer(command_buffer)
            .map_err(VulkanError::Api)?;
        self.device
            .queue_submit(self.queue, command_buffer)
            .map_err(VulkanError::Api)?;
        self.device
            .queue_wait_idle(self.queue)
            .map_err(VulkanError::Api)
    }

    /// Transfer queue handle
    pub fn queue(&self) -> vk::Queue {
        self.queue
    }

    /// Destroy the command pool; later calls are no-ops
    pub fn destroy(&mut self) {
        if self.command_pool != vk::CommandPool::null() {
            self.device.destroy_command_pool(self.command_pool);
            self.command_pool = vk::CommandPool::null();
        }
    }
}

impl<D: GpuDevice> Drop for TransferChannel<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
