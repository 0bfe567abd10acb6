//! Shader module loading
//!
//! SPIR-V files are read fully into memory, decoded into 32-bit words and
//! turned into shader modules that destroy themselves when dropped.

use ash::vk;
use std::io::Cursor;
use std::path::Path;

use super::device::GpuDevice;
use super::error::{VulkanError, VulkanResult};

/// Shader module wrapper with RAII cleanup
pub struct ShaderModule<D: GpuDevice> {
    device: D,
    module: vk::ShaderModule,
}

impl<D: GpuDevice + Clone> ShaderModule<D> {
    /// Create shader module from SPIR-V words
    pub fn from_words(device: &D, code: &[u32]) -> VulkanResult<Self> {
        let module = device
            .create_shader_module(code)
            .map_err(VulkanError::creating("shader module"))?;

        Ok(Self {
            device: device.clone(),
            module,
        })
    }

    /// Load shader from SPIR-V file
    pub fn from_file<P: AsRef<Path>>(device: &D, path: P) -> VulkanResult<Self> {
        let code = read_spirv_file(path.as_ref())?;
        let module = Self::from_words(device, &code)?;
        log::debug!("Loaded shader module from {}", path.as_ref().display());
        Ok(module)
    }
}

impl<D: GpuDevice> ShaderModule<D> {
    /// Get shader module handle
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }
}

impl<D: GpuDevice> Drop for ShaderModule<D> {
    fn drop(&mut self) {
        self.device.destroy_shader_module(self.module);
    }
}

/// Read a SPIR-V file and decode it into words
pub fn read_spirv_file(path: &Path) -> VulkanResult<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|source| VulkanError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|source| VulkanError::InvalidShaderBytecode {
        path: path.to_path_buf(),
        source,
    })
}
