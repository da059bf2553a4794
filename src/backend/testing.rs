// Scripted DriverApi double for unit tests
//
// Each entry point serves canned data, can be told to fail on a given
// phase, and counts how often it was called.

use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::c_char;

use ash::vk;

use super::driver::DriverApi;

/// Copy `text` into a fixed-size, nul-terminated Vulkan name field
pub fn fixed_name<const N: usize>(text: &str) -> [c_char; N] {
    let mut out = [0 as c_char; N];
    for (slot, byte) in out.iter_mut().zip(text.bytes().take(N - 1)) {
        *slot = byte as c_char;
    }
    out
}

pub fn layer(name: &str, spec_version: u32) -> vk::LayerProperties {
    vk::LayerProperties {
        layer_name: fixed_name(name),
        spec_version,
        implementation_version: 1,
        description: fixed_name(&format!("{name} layer")),
    }
}

pub fn extension(name: &str, spec_version: u32) -> vk::ExtensionProperties {
    vk::ExtensionProperties {
        extension_name: fixed_name(name),
        spec_version,
    }
}

/// Canned list served through the two-call protocol
pub struct Enumeration<T> {
    pub items: Vec<T>,
    /// Status returned by the count call
    pub count_status: vk::Result,
    /// Status returned by the fill call
    pub fill_status: vk::Result,
    /// Entries actually written by the fill call, when it should differ from `items.len()`
    pub fill_override: Option<u32>,
    pub count_calls: Cell<u32>,
    pub fill_calls: Cell<u32>,
}

impl<T: Copy> Default for Enumeration<T> {
    fn default() -> Self {
        Self::of(Vec::new())
    }
}

impl<T: Copy> Enumeration<T> {
    pub fn of(items: Vec<T>) -> Self {
        Self {
            items,
            count_status: vk::Result::SUCCESS,
            fill_status: vk::Result::SUCCESS,
            fill_override: None,
            count_calls: Cell::new(0),
            fill_calls: Cell::new(0),
        }
    }

    pub fn failing_count(mut self, status: vk::Result) -> Self {
        self.count_status = status;
        self
    }

    pub fn failing_fill(mut self, status: vk::Result) -> Self {
        self.fill_status = status;
        self
    }

    pub fn filling_only(mut self, written: u32) -> Self {
        self.fill_override = Some(written);
        self
    }

    fn serve(&self, count: &mut u32, buffer: Option<&mut [T]>) -> vk::Result {
        match buffer {
            None => {
                self.count_calls.set(self.count_calls.get() + 1);
                *count = self.items.len() as u32;
                self.count_status
            }
            Some(buffer) => {
                self.fill_calls.set(self.fill_calls.get() + 1);
                assert_eq!(*count as usize, buffer.len(), "count must carry the buffer capacity");
                let available = self
                    .fill_override
                    .unwrap_or(self.items.len() as u32)
                    .min(self.items.len() as u32);
                let written = available.min(buffer.len() as u32);
                buffer[..written as usize].copy_from_slice(&self.items[..written as usize]);
                *count = written;
                if written < available {
                    return vk::Result::INCOMPLETE;
                }
                self.fill_status
            }
        }
    }
}

pub struct ScriptedSurface {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub capabilities_status: vk::Result,
    pub capabilities_calls: Cell<u32>,
    pub formats: Enumeration<vk::SurfaceFormatKHR>,
    pub present_modes: Enumeration<vk::PresentModeKHR>,
}

impl Default for ScriptedSurface {
    fn default() -> Self {
        Self {
            capabilities: capabilities(2, 3),
            capabilities_status: vk::Result::SUCCESS,
            capabilities_calls: Cell::new(0),
            formats: Enumeration::of(vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }]),
            present_modes: Enumeration::of(vec![vk::PresentModeKHR::FIFO]),
        }
    }
}

pub fn capabilities(min_images: u32, max_images: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min_images,
        max_image_count: max_images,
        current_extent: vk::Extent2D {
            width: 800,
            height: 600,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        max_image_array_layers: 1,
        ..Default::default()
    }
}

pub struct ScriptedDevice {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
    pub extensions: Enumeration<vk::ExtensionProperties>,
    pub surface: ScriptedSurface,
}

impl ScriptedDevice {
    pub fn new(name: &str, device_type: vk::PhysicalDeviceType, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            device_type,
            api_version: vk::make_api_version(0, 1, 3, 250),
            extensions: Enumeration::of(extensions.iter().map(|name| extension(name, 1)).collect()),
            surface: ScriptedSurface::default(),
        }
    }
}

/// In-memory driver. Physical device handles are `1..=devices.len()`.
#[derive(Default)]
pub struct ScriptedDriver {
    pub layers: Enumeration<vk::LayerProperties>,
    pub instance_extensions: Enumeration<vk::ExtensionProperties>,
    pub device_list: Enumeration<vk::PhysicalDevice>,
    pub devices: HashMap<vk::PhysicalDevice, ScriptedDevice>,
}

impl ScriptedDriver {
    pub fn with_devices(devices: Vec<ScriptedDevice>) -> Self {
        use ash::vk::Handle;

        let mut driver = Self::default();
        let mut handles = Vec::new();
        for (index, device) in devices.into_iter().enumerate() {
            let handle = vk::PhysicalDevice::from_raw(index as u64 + 1);
            handles.push(handle);
            driver.devices.insert(handle, device);
        }
        driver.device_list = Enumeration::of(handles);
        driver
    }

    pub fn device(&self, handle: vk::PhysicalDevice) -> &ScriptedDevice {
        &self.devices[&handle]
    }

    pub fn device_mut(&mut self, handle: vk::PhysicalDevice) -> &mut ScriptedDevice {
        self.devices
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("no scripted device {handle:?}"))
    }
}

impl DriverApi for ScriptedDriver {
    fn enumerate_instance_layer_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        self.layers.serve(count, properties)
    }

    fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        self.instance_extensions.serve(count, properties)
    }

    fn enumerate_physical_devices(
        &self,
        _instance: vk::Instance,
        count: &mut u32,
        devices: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result {
        self.device_list.serve(count, devices)
    }

    fn enumerate_device_extension_properties(
        &self,
        device: vk::PhysicalDevice,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        match self.devices.get(&device) {
            Some(scripted) => scripted.extensions.serve(count, properties),
            None => vk::Result::ERROR_INITIALIZATION_FAILED,
        }
    }

    fn get_physical_device_surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
        capabilities: &mut vk::SurfaceCapabilitiesKHR,
    ) -> vk::Result {
        let Some(scripted) = self.devices.get(&device) else {
            return vk::Result::ERROR_INITIALIZATION_FAILED;
        };
        let surface = &scripted.surface;
        surface.capabilities_calls.set(surface.capabilities_calls.get() + 1);
        *capabilities = surface.capabilities;
        surface.capabilities_status
    }

    fn get_physical_device_surface_formats(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result {
        match self.devices.get(&device) {
            Some(scripted) => scripted.surface.formats.serve(count, formats),
            None => vk::Result::ERROR_INITIALIZATION_FAILED,
        }
    }

    fn get_physical_device_surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
        count: &mut u32,
        present_modes: Option<&mut [vk::PresentModeKHR]>,
    ) -> vk::Result {
        match self.devices.get(&device) {
            Some(scripted) => scripted.surface.present_modes.serve(count, present_modes),
            None => vk::Result::ERROR_INITIALIZATION_FAILED,
        }
    }

    fn physical_device_properties(
        &self,
        device: vk::PhysicalDevice,
    ) -> Option<vk::PhysicalDeviceProperties> {
        let scripted = self.devices.get(&device)?;
        Some(vk::PhysicalDeviceProperties {
            api_version: scripted.api_version,
            device_type: scripted.device_type,
            device_name: fixed_name(&scripted.name),
            ..Default::default()
        })
    }
}
