//! Queue family classification
//!
//! Picks the graphics, present and transfer families the pipeline layer is
//! handed. The transfer family must be a dedicated one: it advertises
//! transfer support and no graphics support.

use ash::vk;

/// Whether a family can run graphics work
pub fn is_graphics_family(family: &vk::QueueFamilyProperties) -> bool {
    family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
}

/// Whether a family is transfer-capable without graphics support
pub fn is_transfer_family(family: &vk::QueueFamilyProperties) -> bool {
    family.queue_flags & (vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER) == vk::QueueFlags::TRANSFER
}

/// Resolved queue family indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Family used for rendering
    pub graphics: u32,
    /// Family used for presentation
    pub present: u32,
    /// Dedicated transfer family
    pub transfer: u32,
}

impl QueueFamilyIndices {
    /// Lowest-indexed family for each role
    ///
    /// `present_support` reports whether the windowing surface can present
    /// from a family index. Returns `None` if any role has no family.
    pub fn find(
        families: &[vk::QueueFamilyProperties],
        mut present_support: impl FnMut(u32) -> bool,
    ) -> Option<Self> {
        let indexed = || families.iter().zip(0u32..);

        let graphics = indexed().find(|(f, _)| is_graphics_family(f)).map(|(_, i)| i);
        let transfer = indexed().find(|(f, _)| is_transfer_family(f)).map(|(_, i)| i);
        let present = (0u32..).take(families.len()).find(|&i| present_support(i));

        let indices = Self {
            graphics: graphics?,
            present: present?,
            transfer: transfer?,
        };
        log::debug!("Resolved queue families: {:?}", indices);
        Some(indices)
    }

    /// Distinct family indices, in graphics, present, transfer order
    pub fn unique(&self) -> Vec<u32> {
        let mut unique = Vec::with_capacity(3);
        for index in [self.graphics, self.present, self.transfer] {
            if !unique.contains(&index) {
                unique.push(index);
            }
        }
        unique
    }
}
