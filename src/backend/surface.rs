// Surface negotiation - what a physical device can present to a surface
//
// query_surface_support gathers the raw capability snapshot. The choose_*
// helpers turn a snapshot into concrete swap chain parameters.

use ash::vk;

use super::driver::DriverApi;
use super::probe::enumerate;
use super::result::check_or_fail;
use crate::error::HalError;

/// Inclusive `[min, max]` bounds reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityRange<T> {
    pub min: T,
    pub max: T,
}

/// Snapshot of a surface's presentation support on one physical device
#[derive(Debug, Clone)]
pub struct SurfaceSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

/// Query capabilities, formats and present modes of `surface` on `device`.
///
/// The capability query runs first and any failure aborts the whole query.
/// Zero formats or present modes yield empty lists; `is_usable` tells the
/// caller whether a swap chain can be built.
pub fn query_surface_support<D: DriverApi + ?Sized>(
    driver: &D,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> Result<SurfaceSupportDetails, HalError> {
    let mut capabilities = vk::SurfaceCapabilitiesKHR::default();
    check_or_fail(
        driver.get_physical_device_surface_capabilities(device, surface, &mut capabilities),
        "failed to query Vulkan surface capabilities",
    )?;
    validate_capabilities(&capabilities)?;

    let formats = enumerate("Vulkan surface formats", |count, buffer| {
        driver.get_physical_device_surface_formats(device, surface, count, buffer)
    })?;

    let present_modes = enumerate("Vulkan surface present modes", |count, buffer| {
        driver.get_physical_device_surface_present_modes(device, surface, count, buffer)
    })?;

    log::debug!(
        "Surface support: {} formats, {} present modes, images {}..{}",
        formats.len(),
        present_modes.len(),
        capabilities.min_image_count,
        capabilities.max_image_count
    );

    Ok(SurfaceSupportDetails {
        capabilities,
        formats,
        present_modes,
    })
}

fn check_range(context: &str, min: u32, max: u32) -> Result<(), HalError> {
    if min > max {
        return Err(HalError::InvalidRange {
            context: context.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

// max_image_count == 0 means "no upper limit"
fn validate_capabilities(caps: &vk::SurfaceCapabilitiesKHR) -> Result<(), HalError> {
    if caps.max_image_count != 0 {
        check_range(
            "invalid surface image count range",
            caps.min_image_count,
            caps.max_image_count,
        )?;
    }
    check_range(
        "invalid surface extent width range",
        caps.min_image_extent.width,
        caps.max_image_extent.width,
    )?;
    check_range(
        "invalid surface extent height range",
        caps.min_image_extent.height,
        caps.max_image_extent.height,
    )
}

impl SurfaceSupportDetails {
    /// At least one format and one present mode
    pub fn is_usable(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }

    /// Image count bounds with "unlimited" resolved to `u32::MAX`
    pub fn image_count_range(&self) -> CapabilityRange<u32> {
        let caps = &self.capabilities;
        CapabilityRange {
            min: caps.min_image_count,
            max: if caps.max_image_count == 0 {
                u32::MAX
            } else {
                caps.max_image_count
            },
        }
    }

    pub fn extent_range(&self) -> CapabilityRange<vk::Extent2D> {
        CapabilityRange {
            min: self.capabilities.min_image_extent,
            max: self.capabilities.max_image_extent,
        }
    }

    /// Prefer `B8G8R8A8_SRGB`/sRGB-nonlinear when asked, else the first reported format
    pub fn choose_format(&self, prefer_srgb: bool) -> Option<vk::SurfaceFormatKHR> {
        let srgb = self.formats.iter().find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        });

        match srgb {
            Some(format) if prefer_srgb => Some(*format),
            _ => self.formats.first().copied(),
        }
    }

    /// `preferred` if supported, then MAILBOX, then FIFO (always available)
    pub fn choose_present_mode(&self, preferred: vk::PresentModeKHR) -> vk::PresentModeKHR {
        [preferred, vk::PresentModeKHR::MAILBOX]
            .into_iter()
            .find(|mode| self.present_modes.contains(mode))
            .unwrap_or(vk::PresentModeKHR::FIFO)
    }

    /// The surface's current extent, or the window size clamped into range
    pub fn choose_extent(&self, width: u32, height: u32) -> vk::Extent2D {
        let caps = &self.capabilities;
        if caps.current_extent.width != u32::MAX {
            return caps.current_extent;
        }

        vk::Extent2D {
            width: width
                .max(caps.min_image_extent.width)
                .min(caps.max_image_extent.width),
            height: height
                .max(caps.min_image_extent.height)
                .min(caps.max_image_extent.height),
        }
    }

    /// One image above the minimum for triple buffering, capped at the maximum
    pub fn choose_image_count(&self) -> u32 {
        let range = self.image_count_range();
        range.min.saturating_add(1).min(range.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{capabilities, Enumeration, ScriptedDevice, ScriptedDriver};
    use ash::vk::Handle;

    fn single_device() -> (ScriptedDriver, vk::PhysicalDevice) {
        let driver = ScriptedDriver::with_devices(vec![ScriptedDevice::new(
            "gpu",
            vk::PhysicalDeviceType::DISCRETE_GPU,
            &["VK_KHR_swapchain"],
        )]);
        (driver, vk::PhysicalDevice::from_raw(1))
    }

    fn surface() -> vk::SurfaceKHR {
        vk::SurfaceKHR::from_raw(0x5eed)
    }

    #[test]
    fn test_zero_formats_skip_fill_call() {
        let (mut driver, device) = single_device();
        {
            let scripted = &mut driver.device_mut(device).surface;
            scripted.formats = Enumeration::of(Vec::new());
            scripted.present_modes =
                Enumeration::of(vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX]);
        }

        let details = query_surface_support(&driver, device, surface()).unwrap();
        assert!(details.formats.is_empty());
        assert_eq!(details.present_modes.len(), 2);
        let range = details.image_count_range();
        assert!(range.min <= range.max);
        assert!(!details.is_usable());

        let scripted = &driver.device(device).surface;
        assert_eq!(scripted.formats.count_calls.get(), 1);
        assert_eq!(scripted.formats.fill_calls.get(), 0);
        assert_eq!(scripted.present_modes.fill_calls.get(), 1);
    }

    #[test]
    fn test_zero_present_modes_skip_fill_call() {
        let (mut driver, device) = single_device();
        driver.device_mut(device).surface.present_modes = Enumeration::of(Vec::new());

        let details = query_surface_support(&driver, device, surface()).unwrap();
        assert_eq!(details.formats.len(), 1);
        assert!(details.present_modes.is_empty());
        assert_eq!(driver.device(device).surface.present_modes.fill_calls.get(), 0);
    }

    #[test]
    fn test_capability_failure_short_circuits() {
        let (mut driver, device) = single_device();
        driver.device_mut(device).surface.capabilities_status = vk::Result::ERROR_SURFACE_LOST_KHR;

        let err = query_surface_support(&driver, device, surface()).unwrap_err();
        assert!(err.to_string().contains("failed to query Vulkan surface capabilities"));
        assert!(err.to_string().contains("VK_ERROR_SURFACE_LOST_KHR"));

        let scripted = &driver.device(device).surface;
        assert_eq!(scripted.capabilities_calls.get(), 1);
        assert_eq!(scripted.formats.count_calls.get(), 0);
        assert_eq!(scripted.present_modes.count_calls.get(), 0);
    }

    #[test]
    fn test_format_failure_aborts_whole_query() {
        let (mut driver, device) = single_device();
        driver.device_mut(device).surface.formats = Enumeration::of(vec![vk::SurfaceFormatKHR::default()])
            .failing_fill(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let err = query_surface_support(&driver, device, surface()).unwrap_err();
        assert!(err.to_string().contains("failed to query Vulkan surface formats"));
        assert_eq!(driver.device(device).surface.present_modes.count_calls.get(), 0);
    }

    #[test]
    fn test_inverted_image_count_range_is_rejected() {
        let (mut driver, device) = single_device();
        driver.device_mut(device).surface.capabilities = capabilities(4, 2);

        let err = query_surface_support(&driver, device, surface()).unwrap_err();
        assert!(matches!(err, HalError::InvalidRange { min: 4, max: 2, .. }));
    }

    #[test]
    fn test_inverted_extent_range_is_rejected() {
        let (mut driver, device) = single_device();
        driver.device_mut(device).surface.capabilities.min_image_extent.width = 8192;

        let err = query_surface_support(&driver, device, surface()).unwrap_err();
        assert!(matches!(err, HalError::InvalidRange { min: 8192, max: 4096, .. }));
        assert!(err.to_string().contains("invalid surface extent width range"));

        let (mut driver, device) = single_device();
        {
            let caps = &mut driver.device_mut(device).surface.capabilities;
            caps.min_image_extent.height = 600;
            caps.max_image_extent.height = 300;
        }

        let err = query_surface_support(&driver, device, surface()).unwrap_err();
        assert!(err.to_string().contains("invalid surface extent height range"));
        assert_eq!(driver.device(device).surface.formats.count_calls.get(), 0);
    }

    #[test]
    fn test_choose_extent_tolerates_unvalidated_ranges() {
        let mut caps = capabilities(2, 3);
        caps.current_extent = vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };
        caps.min_image_extent = vk::Extent2D {
            width: 500,
            height: 500,
        };
        caps.max_image_extent = vk::Extent2D {
            width: 100,
            height: 100,
        };
        let details = SurfaceSupportDetails {
            capabilities: caps,
            formats: Vec::new(),
            present_modes: Vec::new(),
        };

        let extent = details.choose_extent(300, 50);
        assert_eq!((extent.width, extent.height), (100, 100));
    }

    #[test]
    fn test_unbounded_image_count() {
        let (mut driver, device) = single_device();
        driver.device_mut(device).surface.capabilities = capabilities(3, 0);

        let details = query_surface_support(&driver, device, surface()).unwrap();
        assert_eq!(details.image_count_range().max, u32::MAX);
        assert_eq!(details.choose_image_count(), 4);
    }

    #[test]
    fn test_choose_helpers() {
        let mut caps = capabilities(2, 2);
        caps.current_extent = vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };
        let details = SurfaceSupportDetails {
            capabilities: caps,
            formats: vec![
                vk::SurfaceFormatKHR {
                    format: vk::Format::R8G8B8A8_UNORM,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                },
                vk::SurfaceFormatKHR {
                    format: vk::Format::B8G8R8A8_SRGB,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                },
            ],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE],
        };

        assert_eq!(details.choose_format(true).map(|f| f.format), Some(vk::Format::B8G8R8A8_SRGB));
        assert_eq!(details.choose_format(false).map(|f| f.format), Some(vk::Format::R8G8B8A8_UNORM));
        assert_eq!(details.choose_present_mode(vk::PresentModeKHR::IMMEDIATE), vk::PresentModeKHR::IMMEDIATE);
        assert_eq!(details.choose_present_mode(vk::PresentModeKHR::MAILBOX), vk::PresentModeKHR::FIFO);
        assert_eq!(details.choose_image_count(), 2);

        let extent = details.choose_extent(10_000, 0);
        assert_eq!((extent.width, extent.height), (4096, 1));
    }
}
