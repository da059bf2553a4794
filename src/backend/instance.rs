// Vulkan instance - loader, instance and debug messenger
//
// Responsibilities:
// - Probe instance layers/extensions before creating anything
// - Enable validation and surface extensions only if the driver has them
// - Route validation messages into the log
// - Create presentation surfaces from window handles

use std::ffi::{CStr, CString};

use anyhow::{Context, Result};
use ash::extensions::{ext::DebugUtils, khr};
use ash::{vk, Entry};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use super::driver::AshDriver;
use super::probe::{
    has_extension, has_layer, query_instance_extensions, query_instance_layers,
    ExtensionDescriptor, LayerDescriptor,
};
use crate::error::HalError;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Owns the Vulkan loader and instance for the life of the render system
pub struct VulkanInstance {
    // Order matters for drop
    pub surface_loader: khr::Surface,
    pub instance: ash::Instance,
    entry: Entry,

    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,

    /// Capability snapshots taken before instance creation
    pub layers: Vec<LayerDescriptor>,
    pub extensions: Vec<ExtensionDescriptor>,
    pub enabled_extensions: Vec<CString>,
}

impl VulkanInstance {
    /// Load Vulkan and create an instance
    ///
    /// # Arguments
    /// * `app_name` - Application name for debugging
    /// * `enable_validation` - Request the Khronos validation layer
    pub fn new(app_name: &str, enable_validation: bool) -> Result<Self> {
        log::info!("Creating Vulkan instance: {}", app_name);

        let entry = unsafe { Entry::load() }
            .context("Failed to load Vulkan library. Is Vulkan installed?")?;

        // Probe before creating: the instance only gets what the driver has
        let probe = AshDriver::new(&entry);
        let layers = query_instance_layers(&probe)?;
        let extensions = query_instance_extensions(&probe)?;

        for layer in &layers {
            log::debug!("Instance layer: {}", layer);
        }
        for extension in &extensions {
            log::debug!("Instance extension: {}", extension);
        }

        let validation = enable_validation
            && match VALIDATION_LAYER.to_str() {
                Ok(name) if has_layer(&layers, name) => true,
                _ => {
                    log::warn!("Validation requested but VK_LAYER_KHRONOS_validation is not installed");
                    false
                }
            };

        let enabled_extensions = Self::select_extensions(&extensions, validation);
        let instance = Self::create_instance(&entry, app_name, &enabled_extensions, validation)?;

        let debug_utils = if validation {
            Some(Self::setup_debug_messenger(&entry, &instance)?)
        } else {
            None
        };

        let surface_loader = khr::Surface::new(&entry, &instance);

        Ok(Self {
            surface_loader,
            instance,
            entry,
            debug_utils,
            layers,
            extensions,
            enabled_extensions,
        })
    }

    /// Driver view over this instance, for the probe/negotiation functions
    pub fn driver(&self) -> AshDriver<'_> {
        AshDriver::new(&self.entry)
            .with_instance(&self.instance)
            .with_surface(&self.surface_loader)
    }

    pub fn handle(&self) -> vk::Instance {
        self.instance.handle()
    }

    fn select_extensions(available: &[ExtensionDescriptor], validation: bool) -> Vec<CString> {
        let mut wanted = vec![
            khr::Surface::name(),
            khr::Win32Surface::name(),
            khr::XlibSurface::name(),
            khr::WaylandSurface::name(),
        ];
        if validation {
            wanted.push(DebugUtils::name());
        }

        wanted
            .into_iter()
            .filter(|name| {
                name.to_str()
                    .map_or(false, |name| has_extension(available, name))
            })
            .map(CString::from)
            .collect()
    }

    fn create_instance(
        entry: &Entry,
        app_name: &str,
        extensions: &[CString],
        validation: bool,
    ) -> Result<ash::Instance> {
        let app_name_cstr = CString::new(app_name)?;
        let engine_name = CString::new("render-hal")?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let extension_ptrs: Vec<_> = extensions.iter().map(|name| name.as_ptr()).collect();
        let layer_names = if validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .map_err(|code| HalError::backend("failed to create Vulkan instance", code))?;

        Ok(instance)
    }

    fn setup_debug_messenger(
        entry: &Entry,
        instance: &ash::Instance,
    ) -> Result<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = DebugUtils::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(|code| HalError::backend("failed to create Vulkan debug messenger", code))?;

        Ok((debug_utils, messenger))
    }

    /// Create a presentation surface for a window.
    ///
    /// The caller owns the surface and must destroy it with
    /// `surface_loader.destroy_surface` before this instance is dropped.
    pub fn create_surface(
        &self,
        window: &(impl HasWindowHandle + HasDisplayHandle),
    ) -> Result<vk::SurfaceKHR> {
        let window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();
        let display_handle = window
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();

        let surface = match (display_handle, window_handle) {
            (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
                let hinstance = handle.hinstance.map(|h| h.get()).unwrap_or(0) as *const std::ffi::c_void;
                let hwnd = handle.hwnd.get() as *const std::ffi::c_void;
                let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                    .hinstance(hinstance)
                    .hwnd(hwnd);
                let loader = khr::Win32Surface::new(&self.entry, &self.instance);
                unsafe { loader.create_win32_surface(&create_info, None) }
            }
            (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(handle)) => {
                let dpy = display
                    .display
                    .context("Xlib display handle has no display connection")?;
                let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                    .dpy(dpy.as_ptr() as *mut _)
                    .window(handle.window);
                let loader = khr::XlibSurface::new(&self.entry, &self.instance);
                unsafe { loader.create_xlib_surface(&create_info, None) }
            }
            (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(handle)) => {
                let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                    .display(display.display.as_ptr())
                    .surface(handle.surface.as_ptr());
                let loader = khr::WaylandSurface::new(&self.entry, &self.instance);
                unsafe { loader.create_wayland_surface(&create_info, None) }
            }
            _ => anyhow::bail!("Unsupported window handle type"),
        };

        Ok(surface.map_err(|code| HalError::backend("failed to create Vulkan surface", code))?)
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan instance...");

        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}
