// Capability probing - layers, extensions and physical devices
//
// All queries are pure: they read through the driver, allocate a fresh
// Vec per call and keep the order the driver reported.

use std::ffi::c_char;
use std::fmt;

use ash::vk;

use super::driver::DriverApi;
use super::result::check_or_fail;
use crate::error::HalError;

/// An instance layer the driver can enable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDescriptor {
    pub name: String,
    /// Vulkan API version the layer was written against
    pub spec_version: u32,
    pub implementation_version: u32,
    pub description: String,
}

/// An instance or device extension the driver can enable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    pub name: String,
    pub spec_version: u32,
}

impl From<&vk::LayerProperties> for LayerDescriptor {
    fn from(props: &vk::LayerProperties) -> Self {
        Self {
            name: fixed_str(&props.layer_name),
            spec_version: props.spec_version,
            implementation_version: props.implementation_version,
            description: fixed_str(&props.description),
        }
    }
}

impl From<&vk::ExtensionProperties> for ExtensionDescriptor {
    fn from(props: &vk::ExtensionProperties) -> Self {
        Self {
            name: fixed_str(&props.extension_name),
            spec_version: props.spec_version,
        }
    }
}

impl fmt::Display for LayerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (spec {}, impl {})",
            self.name,
            api_version_to_string(self.spec_version),
            self.implementation_version
        )
    }
}

impl fmt::Display for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rev {})", self.name, self.spec_version)
    }
}

/// Read a nul-terminated name out of a fixed-size Vulkan char array
pub fn fixed_str(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Format a packed Vulkan version as `major.minor.patch`
pub fn api_version_to_string(version: u32) -> String {
    format!(
        "{}.{}.{}",
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version)
    )
}

/// Run a count-then-fill enumeration.
///
/// `call` receives `None` for the count phase and the freshly sized buffer
/// for the fill phase. A zero count skips the fill call. A fill that writes
/// a different number of entries than the count phase announced is a
/// `CountMismatch`.
pub(crate) fn enumerate<T, F>(what: &str, mut call: F) -> Result<Vec<T>, HalError>
where
    T: Default + Clone,
    F: FnMut(&mut u32, Option<&mut [T]>) -> vk::Result,
{
    let mut count = 0;
    check_or_fail(call(&mut count, None), &format!("failed to query number of {what}"))?;

    if count == 0 {
        return Ok(Vec::new());
    }

    let mut items = vec![T::default(); count as usize];
    let mut written = count;
    check_or_fail(call(&mut written, Some(items.as_mut_slice())), &format!("failed to query {what}"))?;

    if written != count {
        return Err(HalError::CountMismatch {
            context: format!("failed to query {what}"),
            expected: count,
            actual: written,
        });
    }

    Ok(items)
}

pub fn query_instance_layers<D: DriverApi + ?Sized>(
    driver: &D,
) -> Result<Vec<LayerDescriptor>, HalError> {
    let layers = enumerate("Vulkan instance layer properties", |count, buffer| {
        driver.enumerate_instance_layer_properties(count, buffer)
    })?;
    Ok(layers.iter().map(LayerDescriptor::from).collect())
}

pub fn query_instance_extensions<D: DriverApi + ?Sized>(
    driver: &D,
) -> Result<Vec<ExtensionDescriptor>, HalError> {
    let extensions = enumerate("Vulkan instance extension properties", |count, buffer| {
        driver.enumerate_instance_extension_properties(count, buffer)
    })?;
    Ok(extensions.iter().map(ExtensionDescriptor::from).collect())
}

pub fn query_physical_devices<D: DriverApi + ?Sized>(
    driver: &D,
    instance: vk::Instance,
) -> Result<Vec<vk::PhysicalDevice>, HalError> {
    enumerate("Vulkan physical devices", |count, buffer| {
        driver.enumerate_physical_devices(instance, count, buffer)
    })
}

pub fn query_device_extensions<D: DriverApi + ?Sized>(
    driver: &D,
    device: vk::PhysicalDevice,
) -> Result<Vec<ExtensionDescriptor>, HalError> {
    let extensions = enumerate("Vulkan device extension properties", |count, buffer| {
        driver.enumerate_device_extension_properties(device, count, buffer)
    })?;
    Ok(extensions.iter().map(ExtensionDescriptor::from).collect())
}

/// True if `name` appears in `extensions`
pub fn has_extension(extensions: &[ExtensionDescriptor], name: &str) -> bool {
    extensions.iter().any(|ext| ext.name == name)
}

/// True if `name` appears in `layers`
pub fn has_layer(layers: &[LayerDescriptor], name: &str) -> bool {
    layers.iter().any(|layer| layer.name == name)
}
