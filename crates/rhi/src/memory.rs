//! Device memory-type selection.
//!
//! Every buffer and image allocation picks a memory type by filtering the
//! device's memory-type table against the resource's `memory_type_bits` and
//! the requested property flags. Two matching policies are supported:
//!
//! - [`MemoryTypePolicy::Superset`]: accept a type whose flags contain the
//!   requested set. This is the default and matches common Vulkan guidance.
//! - [`MemoryTypePolicy::Exact`]: require bit-for-bit flag equality. This is
//!   stricter and can fail on hardware that exposes extra flags (e.g.
//!   DEVICE_LOCAL | HOST_VISIBLE types on integrated GPUs), so it is opt-in.

use ash::vk;

use crate::error::{RhiError, RhiResult};

/// How candidate memory types are matched against requested property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryTypePolicy {
    /// The candidate's flags must contain all requested flags.
    #[default]
    Superset,
    /// The candidate's flags must equal the requested flags exactly.
    Exact,
}

/// Selects the first memory type compatible with `type_bits` whose property
/// flags satisfy `required` under the given policy.
///
/// `type_bits` comes from `vk::MemoryRequirements::memory_type_bits`; bit *i*
/// set means memory type index *i* is usable for the resource.
///
/// # Errors
///
/// Returns [`RhiError::NoCompatibleMemoryType`] when no type matches. Callers
/// treat this as fatal; there is no fallback type or retry path.
pub fn find_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
    policy: MemoryTypePolicy,
) -> RhiResult<u32> {
    for index in 0..memory_properties.memory_type_count {
        if type_bits & (1 << index) == 0 {
            continue;
        }

        let flags = memory_properties.memory_types[index as usize].property_flags;
        let matches = match policy {
            MemoryTypePolicy::Superset => flags.contains(required),
            MemoryTypePolicy::Exact => flags == required,
        };

        if matches {
            return Ok(index);
        }
    }

    Err(RhiError::NoCompatibleMemoryType {
        type_bits,
        flags: required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_properties(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: types.len() as u32,
            ..Default::default()
        };
        for (i, &flags) in types.iter().enumerate() {
            props.memory_types[i].property_flags = flags;
        }
        props
    }

    #[test]
    fn superset_accepts_extra_flags() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT
                | vk::MemoryPropertyFlags::HOST_CACHED,
        ]);

        let index = find_memory_type(
            &props,
            0b11,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            MemoryTypePolicy::Superset,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn exact_rejects_extra_flags() {
        // Only type 1 is host-visible, but it carries HOST_CACHED on top.
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT
                | vk::MemoryPropertyFlags::HOST_CACHED,
        ]);

        let result = find_memory_type(
            &props,
            0b11,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            MemoryTypePolicy::Exact,
        );
        assert!(matches!(
            result,
            Err(RhiError::NoCompatibleMemoryType { .. })
        ));
    }

    #[test]
    fn exact_matches_identical_flags() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);

        let index = find_memory_type(
            &props,
            0b11,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            MemoryTypePolicy::Exact,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn type_bits_filter_skips_incompatible_types() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        // Resource only allows type 1.
        let index = find_memory_type(
            &props,
            0b10,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            MemoryTypePolicy::Superset,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn first_matching_type_wins() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        let index = find_memory_type(
            &props,
            0b11,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            MemoryTypePolicy::Superset,
        )
        .unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn no_match_is_an_error() {
        let props = memory_properties(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);

        let result = find_memory_type(
            &props,
            0b1,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            MemoryTypePolicy::Superset,
        );
        assert!(matches!(
            result,
            Err(RhiError::NoCompatibleMemoryType { .. })
        ));
    }

    #[test]
    fn default_policy_is_superset() {
        assert_eq!(MemoryTypePolicy::default(), MemoryTypePolicy::Superset);
    }
}
