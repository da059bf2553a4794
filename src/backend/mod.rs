// Backend module - Vulkan capability negotiation
//
// Design: every native call goes through DriverApi and is checked by the
// result translator at the call site. Nothing here caches or retries.

pub mod device;
pub mod driver;
pub mod instance;
pub mod probe;
pub mod result;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use device::{select_physical_device, DeviceRequirements, PhysicalDeviceInfo};
pub use driver::{AshDriver, DriverApi};
pub use instance::VulkanInstance;
pub use probe::{
    api_version_to_string, fixed_str, query_device_extensions, query_instance_extensions,
    query_instance_layers, query_physical_devices, ExtensionDescriptor, LayerDescriptor,
};
pub use result::{check_or_fail, classify, translate, Outcome, StatusCategory};
pub use surface::{query_surface_support, CapabilityRange, SurfaceSupportDetails};
