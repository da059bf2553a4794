// Driver entry points - the native calls this layer consumes
//
// DriverApi mirrors the raw Vulkan signatures closely: count-then-fill
// enumerations report a vk::Result and never allocate. AshDriver forwards
// to the function tables loaded by ash. It borrows the entry, instance and
// surface loader; their owner keeps them alive and destroys them.

use std::ptr;

use ash::extensions::khr::Surface;
use ash::{vk, Entry, Instance};

/// Raw backend entry points.
///
/// For the enumeration calls, `count` is read as the buffer capacity when a
/// buffer is passed and always receives the number of entries available or
/// written, following the Vulkan two-call convention.
pub trait DriverApi {
    fn enumerate_instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result;

    fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result;

    fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
        count: &mut u32,
        devices: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result;

    fn enumerate_device_extension_properties(
        &self,
        device: vk::PhysicalDevice,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result;

    fn get_physical_device_surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        capabilities: &mut vk::SurfaceCapabilitiesKHR,
    ) -> vk::Result;

    fn get_physical_device_surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result;

    fn get_physical_device_surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        present_modes: Option<&mut [vk::PresentModeKHR]>,
    ) -> vk::Result;

    /// Returns `None` when instance-level functions are not loaded
    fn physical_device_properties(
        &self,
        device: vk::PhysicalDevice,
    ) -> Option<vk::PhysicalDeviceProperties>;
}

/// DriverApi over ash function tables
#[derive(Clone, Copy)]
pub struct AshDriver<'a> {
    entry: &'a Entry,
    instance: Option<&'a Instance>,
    surface: Option<&'a Surface>,
}

impl<'a> AshDriver<'a> {
    /// Pre-instance driver: only the global enumeration calls succeed
    pub fn new(entry: &'a Entry) -> Self {
        Self {
            entry,
            instance: None,
            surface: None,
        }
    }

    pub fn with_instance(mut self, instance: &'a Instance) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn with_surface(mut self, surface: &'a Surface) -> Self {
        self.surface = Some(surface);
        self
    }
}

fn out_ptr<T>(buffer: Option<&mut [T]>) -> *mut T {
    buffer.map_or(ptr::null_mut(), |buffer| buffer.as_mut_ptr())
}

// Instance-level calls made before the instance exists behave like a
// driver that failed to initialize.
const NOT_LOADED: vk::Result = vk::Result::ERROR_INITIALIZATION_FAILED;

impl DriverApi for AshDriver<'_> {
    fn enumerate_instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        let fp = self.entry.fp_v1_0().enumerate_instance_layer_properties;
        unsafe { fp(count, out_ptr(properties)) }
    }

    fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let fp = self.entry.fp_v1_0().enumerate_instance_extension_properties;
        unsafe { fp(ptr::null(), count, out_ptr(properties)) }
    }

    fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
        count: &mut u32,
        devices: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result {
        let Some(loaded) = self.instance else {
            return NOT_LOADED;
        };
        let fp = loaded.fp_v1_0().enumerate_physical_devices;
        unsafe { fp(instance, count, out_ptr(devices)) }
    }

    fn enumerate_device_extension_properties(
        &self,
        device: vk::PhysicalDevice,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let Some(instance) = self.instance else {
            return NOT_LOADED;
        };
        let fp = instance.fp_v1_0().enumerate_device_extension_properties;
        unsafe { fp(device, ptr::null(), count, out_ptr(properties)) }
    }

    fn get_physical_device_surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        capabilities: &mut vk::SurfaceCapabilitiesKHR,
    ) -> vk::Result {
        let Some(loader) = self.surface else {
            return vk::Result::ERROR_EXTENSION_NOT_PRESENT;
        };
        let fp = loader.fp().get_physical_device_surface_capabilities_khr;
        unsafe { fp(device, surface, capabilities) }
    }

    fn get_physical_device_surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result {
        let Some(loader) = self.surface else {
            return vk::Result::ERROR_EXTENSION_NOT_PRESENT;
        };
        let fp = loader.fp().get_physical_device_surface_formats_khr;
        unsafe { fp(device, surface, count, out_ptr(formats)) }
    }

    fn get_physical_device_surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        present_modes: Option<&mut [vk::PresentModeKHR]>,
    ) -> vk::Result {
        let Some(loader) = self.surface else {
            return vk::Result::ERROR_EXTENSION_NOT_PRESENT;
        };
        let fp = loader.fp().get_physical_device_surface_present_modes_khr;
        unsafe { fp(device, surface, count, out_ptr(present_modes)) }
    }

    fn physical_device_properties(
        &self,
        device: vk::PhysicalDevice,
    ) -> Option<vk::PhysicalDeviceProperties> {
        self.instance
            .map(|instance| unsafe { instance.get_physical_device_properties(device) })
    }
}
