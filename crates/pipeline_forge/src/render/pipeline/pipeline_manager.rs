//! Pipeline manager for a named set of graphics pipelines
//!
//! Creates pipelines from descriptors, owns the vertex buffers of pipelines
//! that declare a vertex layout, uploads vertex data through the transfer
//! queue and records the per-frame bindings. Pipelines are addressed by name
//! and always visited in sorted name order.

use ash::vk;
use slotmap::SlotMap;
use std::collections::{BTreeMap, HashSet};

use super::fixed_function::{pipeline_desc_for, PipelineTargets, RECORDED_LINE_WIDTH};
use super::pipeline_config::{PipelineDescriptor, Topology};
use crate::render::vulkan::{
    AllocatedBuffer, GpuDevice, QueueFamilyIndices, ShaderModule, TransferChannel, VulkanError,
    VulkanResult,
};

slotmap::new_key_type! {
    /// Arena key of a registered pipeline
    struct PipelineKey;
}

/// Host-visible staging buffer paired with the device-local buffer it feeds
pub struct BufferPair<D: GpuDevice> {
    staging: AllocatedBuffer<D>,
    device_local: AllocatedBuffer<D>,
}

impl<D: GpuDevice + Clone> BufferPair<D> {
    /// Allocate both halves with `size` bytes each
    ///
    /// The staging buffer is used by the transfer family only. The device
    /// buffer is shared between the transfer and graphics families.
    fn new(device: &D, size: vk::DeviceSize, families: QueueFamilyIndices) -> VulkanResult<Self> {
        let staging = AllocatedBuffer::new(
            device,
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            &[families.transfer],
        )?;
        let device_local = AllocatedBuffer::new(
            device,
            size,
            vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            &[families.transfer, families.graphics],
        )?;

        Ok(Self {
            staging,
            device_local,
        })
    }
}

impl<D: GpuDevice> BufferPair<D> {
    /// Host-writable transfer source
    pub fn staging(&self) -> &AllocatedBuffer<D> {
        &self.staging
    }

    /// Device-local buffer bound at draw time
    pub fn device(&self) -> &AllocatedBuffer<D> {
        &self.device_local
    }

    /// Size of each half in bytes
    pub fn size(&self) -> vk::DeviceSize {
        self.device_local.size()
    }
}

struct PipelineEntry<D: GpuDevice> {
    descriptor: PipelineDescriptor,
    pipeline: vk::Pipeline,
    buffers: Option<BufferPair<D>>,
    /// Last payload uploaded, replayed on recreation
    uploaded: Option<Vec<u8>>,
}

/// Owns every pipeline, vertex buffer and transfer resource of one render pass
pub struct PipelineManager<D: GpuDevice + Clone> {
    device: D,
    render_pass: vk::RenderPass,
    queue_families: QueueFamilyIndices,
    layout: vk::PipelineLayout,
    transfer: TransferChannel<D>,
    entries: SlotMap<PipelineKey, PipelineEntry<D>>,
    names: BTreeMap<String, PipelineKey>,
}

impl<D: GpuDevice + Clone> PipelineManager<D> {
    /// Create an empty manager
    ///
    /// Builds the shared pipeline layout and the transfer channel on the
    /// transfer family.
    pub fn new(device: &D, render_pass: vk::RenderPass, queue_families: QueueFamilyIndices) -> VulkanResult<Self> {
        let layout = device
            .create_pipeline_layout()
            .map_err(VulkanError::creating("pipeline layout"))?;

        let transfer = match TransferChannel::new(device, queue_families.transfer) {
            Ok(transfer) => transfer,
            Err(err) => {
                device.destroy_pipeline_layout(layout);
                return Err(err);
            }
        };

        log::debug!("Pipeline manager ready ({:?})", queue_families);

        Ok(Self {
            device: device.clone(),
            render_pass,
            queue_families,
            layout,
            transfer,
            entries: SlotMap::with_key(),
            names: BTreeMap::new(),
        })
    }

    /// Create one pipeline per descriptor, in order
    ///
    /// Names are checked against the registry and each other before anything
    /// is created. Shader modules live until the whole batch is done. A
    /// failure aborts the batch; pipelines created earlier in the same batch
    /// stay registered.
    pub fn create_pipelines(&mut self, descriptors: &[PipelineDescriptor]) -> VulkanResult<()> {
        self.ensure_alive()?;

        // Reject duplicates before creating anything
        let mut batch_names = HashSet::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if self.names.contains_key(&descriptor.name) || !batch_names.insert(descriptor.name.as_str()) {
                return Err(VulkanError::DuplicatePipeline {
                    name: descriptor.name.clone(),
                });
            }
        }

        let mut shader_modules = Vec::with_capacity(descriptors.len() * 2);
        for descriptor in descriptors {
            // Load shaders
            let vertex_shader = ShaderModule::from_file(&self.device, &descriptor.vertex_shader_path)?;
            let fragment_shader = ShaderModule::from_file(&self.device, &descriptor.fragment_shader_path)?;

            // Vertex buffers first, so a failed pipeline drops them
            let buffers = match &descriptor.vertex_layout {
                Some(layout) => {
                    let size = layout.data_size();
                    if size == 0 {
                        return Err(VulkanError::InvalidOperation {
                            reason: format!("vertex layout of '{}' declares zero bytes", descriptor.name),
                        });
                    }
                    Some(BufferPair::new(&self.device, size, self.queue_families)?)
                }
                None => None,
            };

            // Create pipeline
            let desc = pipeline_desc_for(
                descriptor,
                PipelineTargets {
                    vertex_shader: vertex_shader.handle(),
                    fragment_shader: fragment_shader.handle(),
                    layout: self.layout,
                    render_pass: self.render_pass,
                },
            );
            let pipeline = self
                .device
                .create_graphics_pipeline(&desc)
                .map_err(VulkanError::creating("graphics pipeline"))?;

            shader_modules.push(vertex_shader);
            shader_modules.push(fragment_shader);

            log::debug!(
                "Created '{}' pipeline ({:?}, vertex buffer: {})",
                descriptor.name,
                descriptor.topology,
                buffers.is_some()
            );

            let key = self.entries.insert(PipelineEntry {
                descriptor: descriptor.clone(),
                pipeline,
                buffers,
                uploaded: None,
            });
            self.names.insert(descriptor.name.clone(), key);
        }

        // Shader modules are no longer needed once every pipeline exists
        let released = shader_modules.len();
        drop(shader_modules);
        log::info!(
            "Created {} pipelines, released {} shader modules",
            descriptors.len(),
            released
        );
        Ok(())
    }

    /// Copy a pipeline's vertex payload to its device-local buffer
    ///
    /// Exactly the layout's declared size is copied. Shorter data is an
    /// error; longer data is truncated. Blocks until the transfer completes.
    pub fn upload_vertex_data(&mut self, name: &str, data: &[u8]) -> VulkanResult<()> {
        let key = self.key(name)?;
        let entry = &mut self.entries[key];

        let Some(buffers) = &entry.buffers else {
            return Err(VulkanError::NoVertexBuffer { name: name.to_string() });
        };
        let size = buffers.size();
        if size == 0 {
            return Err(VulkanError::InvalidOperation {
                reason: format!("vertex layout of '{name}' declares zero bytes"),
            });
        }

        let expected = size as usize;
        if data.len() < expected {
            return Err(VulkanError::InvalidOperation {
                reason: format!(
                    "'{name}' expects {expected} bytes of vertex data, got {}",
                    data.len()
                ),
            });
        }
        if data.len() > expected {
            log::warn!(
                "Upload to '{}' truncated from {} to {} bytes",
                name,
                data.len(),
                expected
            );
        }

        // Stage, then copy to the device-local buffer
        let payload = &data[..expected];
        buffers.staging().write_bytes(payload)?;
        self.transfer
            .copy_allocated(buffers.staging(), buffers.device())?;

        entry.uploaded = Some(payload.to_vec());
        log::info!("Uploaded {} bytes of vertex data to '{}'", expected, name);
        Ok(())
    }

    /// Upload a typed vertex slice
    pub fn upload_vertices<T: bytemuck::Pod>(&mut self, name: &str, vertices: &[T]) -> VulkanResult<()> {
        self.upload_vertex_data(name, bytemuck::cast_slice(vertices))
    }

    /// Append the bindings of every pipeline to a command buffer
    ///
    /// The command buffer must be inside a render pass. For each name in
    /// sorted order: bind the pipeline, bind its vertex buffer at slot 0 if
    /// it has one, and set the dynamic line width for line strips. Draw calls
    /// are left to the caller.
    pub fn record_draw_bindings(&self, command_buffer: vk::CommandBuffer) {
        for key in self.names.values() {
            let entry = &self.entries[*key];

            self.device
                .cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, entry.pipeline);

            if let Some(buffers) = &entry.buffers {
                self.device
                    .cmd_bind_vertex_buffers(command_buffer, 0, &[buffers.device().handle()], &[0]);
            }

            if entry.descriptor.topology == Topology::LineStrip {
                self.device
                    .cmd_set_line_width(command_buffer, RECORDED_LINE_WIDTH);
            }
        }
    }

    /// Rebuild every pipeline for a new render pass and extent
    ///
    /// Used after swap-chain recreation. Tears this manager down, creates a
    /// fresh one from the stored descriptors and uploads any vertex data that
    /// had been uploaded before.
    pub fn recreate(mut self, render_pass: vk::RenderPass, extent: vk::Extent2D) -> VulkanResult<Self> {
        let mut descriptors = Vec::with_capacity(self.entries.len());
        let mut payloads = Vec::new();
        for key in self.names.values() {
            let entry = &self.entries[*key];
            descriptors.push(entry.descriptor.clone().with_extent(extent));
            if let Some(payload) = &entry.uploaded {
                payloads.push((entry.descriptor.name.clone(), payload.clone()));
            }
        }

        self.teardown();

        let mut fresh = Self::new(&self.device, render_pass, self.queue_families)?;
        fresh.create_pipelines(&descriptors)?;
        for (name, payload) in &payloads {
            fresh.upload_vertex_data(name, payload)?;
        }

        log::info!(
            "Recreated {} pipelines at {}x{}",
            descriptors.len(),
            extent.width,
            extent.height
        );
        Ok(fresh)
    }

    /// Release every pipeline, buffer, the shared layout and the transfer pool
    ///
    /// The device must be idle. Calling this more than once is harmless.
    pub fn teardown(&mut self) {
        if self.layout == vk::PipelineLayout::null() {
            return;
        }

        // Pipelines first; buffer pairs release themselves on drop
        let count = self.entries.len();
        self.names.clear();
        for (_, entry) in self.entries.drain() {
            self.device.destroy_pipeline(entry.pipeline);
            log::debug!("Destroyed '{}' pipeline", entry.descriptor.name);
        }

        // Shared layout and transfer pool last
        self.device.destroy_pipeline_layout(self.layout);
        self.layout = vk::PipelineLayout::null();
        self.transfer.destroy();

        log::info!("Pipeline manager torn down ({} pipelines)", count);
    }

    /// Pipeline registered under `name`
    pub fn pipeline(&self, name: &str) -> Option<vk::Pipeline> {
        self.entry(name).map(|entry| entry.pipeline)
    }

    /// Vertex buffers of the pipeline registered under `name`
    pub fn buffer_pair(&self, name: &str) -> Option<&BufferPair<D>> {
        self.entry(name).and_then(|entry| entry.buffers.as_ref())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Number of registered pipelines
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no pipeline is registered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Shared pipeline layout; null after teardown
    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }

    fn entry(&self, name: &str) -> Option<&PipelineEntry<D>> {
        self.names.get(name).and_then(|key| self.entries.get(*key))
    }

    fn key(&self, name: &str) -> VulkanResult<PipelineKey> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| VulkanError::UnknownPipeline { name: name.to_string() })
    }

    fn ensure_alive(&self) -> VulkanResult<()> {
        if self.layout == vk::PipelineLayout::null() {
            return Err(VulkanError::InvalidOperation {
                reason: "pipeline manager has been torn down".to_string(),
            });
        }
        Ok(())
    }
}

impl<D: GpuDevice + Clone> Drop for PipelineManager<D> {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            log::warn!(
                "Pipeline manager dropped with {} live pipelines; tearing down",
                self.entries.len()
            );
        }
        self.teardown();
    }
}
