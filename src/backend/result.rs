// Result translation - VkResult to names, categories and errors
//
// Every driver entry point returns a vk::Result. Nothing in this crate
// retries: anything other than VK_SUCCESS aborts the calling operation.

use std::borrow::Cow;

use ash::vk;

use crate::error::HalError;

/// Normalized class of a backend status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Success,
    /// Not-ready, timeout, incomplete and event states
    Informational,
    /// Host/device memory or object limits
    ResourceExhaustion,
    /// Missing layer/extension/feature, unsupported format, bad driver
    CapabilityMismatch,
    /// Surface lost, window in use, out-of-date or suboptimal swap chain
    SurfaceFault,
    /// Device lost or initialization failure
    DeviceFailure,
    Unknown,
}

/// What a caller one layer up may do about a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    /// Fatal here, but a higher layer can retry or rebuild (e.g. recreate the swap chain)
    Recoverable,
    Fatal,
}

impl StatusCategory {
    pub fn outcome(self) -> Outcome {
        match self {
            StatusCategory::Success => Outcome::Success,
            StatusCategory::Informational | StatusCategory::SurfaceFault => Outcome::Recoverable,
            StatusCategory::ResourceExhaustion
            | StatusCategory::CapabilityMismatch
            | StatusCategory::DeviceFailure
            | StatusCategory::Unknown => Outcome::Fatal,
        }
    }

    pub fn is_recoverable(self) -> bool {
        self.outcome() == Outcome::Recoverable
    }
}

struct StatusEntry {
    code: vk::Result,
    name: &'static str,
    category: StatusCategory,
}

const fn entry(code: vk::Result, name: &'static str, category: StatusCategory) -> StatusEntry {
    StatusEntry {
        code,
        name,
        category,
    }
}

// see https://registry.khronos.org/vulkan/specs/1.3/html/vkspec.html#VkResult
const STATUS_TABLE: &[StatusEntry] = {
    use StatusCategory::*;
    &[
        entry(vk::Result::SUCCESS, "VK_SUCCESS", Success),
        entry(vk::Result::NOT_READY, "VK_NOT_READY", Informational),
        entry(vk::Result::TIMEOUT, "VK_TIMEOUT", Informational),
        entry(vk::Result::EVENT_SET, "VK_EVENT_SET", Informational),
        entry(vk::Result::EVENT_RESET, "VK_EVENT_RESET", Informational),
        entry(vk::Result::INCOMPLETE, "VK_INCOMPLETE", Informational),
        entry(vk::Result::ERROR_OUT_OF_HOST_MEMORY, "VK_ERROR_OUT_OF_HOST_MEMORY", ResourceExhaustion),
        entry(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, "VK_ERROR_OUT_OF_DEVICE_MEMORY", ResourceExhaustion),
        entry(vk::Result::ERROR_INITIALIZATION_FAILED, "VK_ERROR_INITIALIZATION_FAILED", DeviceFailure),
        entry(vk::Result::ERROR_DEVICE_LOST, "VK_ERROR_DEVICE_LOST", DeviceFailure),
        entry(vk::Result::ERROR_MEMORY_MAP_FAILED, "VK_ERROR_MEMORY_MAP_FAILED", ResourceExhaustion),
        entry(vk::Result::ERROR_LAYER_NOT_PRESENT, "VK_ERROR_LAYER_NOT_PRESENT", CapabilityMismatch),
        entry(vk::Result::ERROR_EXTENSION_NOT_PRESENT, "VK_ERROR_EXTENSION_NOT_PRESENT", CapabilityMismatch),
        entry(vk::Result::ERROR_FEATURE_NOT_PRESENT, "VK_ERROR_FEATURE_NOT_PRESENT", CapabilityMismatch),
        entry(vk::Result::ERROR_INCOMPATIBLE_DRIVER, "VK_ERROR_INCOMPATIBLE_DRIVER", CapabilityMismatch),
        entry(vk::Result::ERROR_TOO_MANY_OBJECTS, "VK_ERROR_TOO_MANY_OBJECTS", ResourceExhaustion),
        entry(vk::Result::ERROR_FORMAT_NOT_SUPPORTED, "VK_ERROR_FORMAT_NOT_SUPPORTED", CapabilityMismatch),
        entry(vk::Result::ERROR_FRAGMENTED_POOL, "VK_ERROR_FRAGMENTED_POOL", ResourceExhaustion),
        entry(vk::Result::ERROR_UNKNOWN, "VK_ERROR_UNKNOWN", Unknown),
        entry(vk::Result::ERROR_OUT_OF_POOL_MEMORY, "VK_ERROR_OUT_OF_POOL_MEMORY", ResourceExhaustion),
        entry(vk::Result::ERROR_INVALID_EXTERNAL_HANDLE, "VK_ERROR_INVALID_EXTERNAL_HANDLE", CapabilityMismatch),
        entry(vk::Result::ERROR_FRAGMENTATION, "VK_ERROR_FRAGMENTATION", ResourceExhaustion),
        entry(vk::Result::ERROR_SURFACE_LOST_KHR, "VK_ERROR_SURFACE_LOST_KHR", SurfaceFault),
        entry(vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR, "VK_ERROR_NATIVE_WINDOW_IN_USE_KHR", SurfaceFault),
        entry(vk::Result::SUBOPTIMAL_KHR, "VK_SUBOPTIMAL_KHR", SurfaceFault),
        entry(vk::Result::ERROR_OUT_OF_DATE_KHR, "VK_ERROR_OUT_OF_DATE_KHR", SurfaceFault),
        entry(vk::Result::ERROR_INCOMPATIBLE_DISPLAY_KHR, "VK_ERROR_INCOMPATIBLE_DISPLAY_KHR", CapabilityMismatch),
        entry(vk::Result::ERROR_VALIDATION_FAILED_EXT, "VK_ERROR_VALIDATION_FAILED_EXT", CapabilityMismatch),
        entry(vk::Result::ERROR_INVALID_SHADER_NV, "VK_ERROR_INVALID_SHADER_NV", CapabilityMismatch),
    ]
};

fn lookup(code: vk::Result) -> Option<&'static StatusEntry> {
    STATUS_TABLE.iter().find(|entry| entry.code == code)
}

/// Stable name of a status code.
///
/// Codes missing from the table are rendered as the hexadecimal bit pattern
/// of the raw value, e.g. `0x00003039`.
pub fn translate(code: vk::Result) -> Cow<'static, str> {
    match lookup(code) {
        Some(entry) => Cow::Borrowed(entry.name),
        None => Cow::Owned(format!("0x{:08X}", code.as_raw() as u32)),
    }
}

pub fn classify(code: vk::Result) -> StatusCategory {
    lookup(code).map_or(StatusCategory::Unknown, |entry| entry.category)
}

/// Fails with `context` plus the translated code unless `code` is VK_SUCCESS
pub fn check_or_fail(code: vk::Result, context: &str) -> Result<(), HalError> {
    if code == vk::Result::SUCCESS {
        Ok(())
    } else {
        Err(HalError::backend(context, code))
    }
}

/// Every code the translator has a name for
pub fn known_codes() -> impl Iterator<Item = vk::Result> {
    STATUS_TABLE.iter().map(|entry| entry.code)
}
