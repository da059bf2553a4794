// Physical device selection
//
// Responsibilities:
// - Enumerate candidate GPUs through the capability prober
// - Reject devices missing required extensions or surface support
// - Score the rest (prefer discrete GPU)

use ash::vk;

use super::driver::DriverApi;
use super::probe::{
    api_version_to_string, fixed_str, has_extension, query_device_extensions,
    query_physical_devices, ExtensionDescriptor,
};
use super::surface::{query_surface_support, SurfaceSupportDetails};
use crate::error::HalError;

/// What a device must offer to be considered
#[derive(Debug, Clone, Default)]
pub struct DeviceRequirements<'a> {
    pub extensions: &'a [&'a str],
    /// When set, the device must report a usable format and present mode for it
    pub surface: Option<vk::SurfaceKHR>,
}

/// A physical device that passed selection, with the snapshots used to pick it
#[derive(Debug, Clone)]
pub struct PhysicalDeviceInfo {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
    pub extensions: Vec<ExtensionDescriptor>,
    pub surface_support: Option<SurfaceSupportDetails>,
}

impl PhysicalDeviceInfo {
    pub fn api_version_string(&self) -> String {
        api_version_to_string(self.api_version)
    }
}

fn device_score(device_type: vk::PhysicalDeviceType) -> u32 {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 1000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 100,
        _ => 1,
    }
}

/// Pick the best physical device meeting `requirements`.
///
/// Any failing driver query aborts selection; an unsuitable device is
/// only skipped.
pub fn select_physical_device<D: DriverApi + ?Sized>(
    driver: &D,
    instance: vk::Instance,
    requirements: &DeviceRequirements<'_>,
) -> Result<PhysicalDeviceInfo, HalError> {
    let devices = query_physical_devices(driver, instance)?;
    let candidates = devices.len();

    let mut best: Option<(u32, PhysicalDeviceInfo)> = None;

    for handle in devices {
        let props = driver
            .physical_device_properties(handle)
            .ok_or(HalError::MissingFunctions("Vulkan instance function table"))?;
        let name = fixed_str(&props.device_name);

        let extensions = query_device_extensions(driver, handle)?;
        if let Some(missing) = requirements
            .extensions
            .iter()
            .find(|&&required| !has_extension(&extensions, required))
        {
            log::debug!("Skipping {}: missing device extension {}", name, missing);
            continue;
        }

        let surface_support = match requirements.surface {
            Some(surface) => {
                let support = query_surface_support(driver, handle, surface)?;
                if !support.is_usable() {
                    log::debug!("Skipping {}: no usable surface format/present mode", name);
                    continue;
                }
                Some(support)
            }
            None => None,
        };

        let score = device_score(props.device_type);
        log::debug!(
            "Candidate {} ({:?}, Vulkan {}) score {}",
            name,
            props.device_type,
            api_version_to_string(props.api_version),
            score
        );

        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((
                score,
                PhysicalDeviceInfo {
                    handle,
                    name,
                    device_type: props.device_type,
                    api_version: props.api_version,
                    extensions,
                    surface_support,
                },
            ));
        }
    }

    best.map(|(_, info)| info)
        .ok_or(HalError::NoSuitableDevice { candidates })
}
