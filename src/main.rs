// =============================================================================
// RENDER HAL PROBE - capability report for the current machine
// =============================================================================
//
// Opens a window, negotiates a presentation surface and reports what the
// abstraction layer found:
//
// 1. Instance layers and extensions (probed before instance creation)
// 2. Physical devices and their extensions
// 3. Selected device, surface format, present mode, extent, image count
// 4. Backend-dependent state for the configured backend
//
// Press ESC or close the window to exit.
//
// =============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use ash::vk;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

use render_hal::backend::{
    fixed_str, query_device_extensions, query_physical_devices, select_physical_device,
    DeviceRequirements, DriverApi, PhysicalDeviceInfo, VulkanInstance,
};
use render_hal::context::{Backend, ContextState, Scissor, Viewport};
use render_hal::resource::{Extent3d, TextureDescriptor, TextureType, VulkanTexture};
use render_hal::{decorate, Config, Texture};

const SWAPCHAIN_EXTENSION: &str = "VK_KHR_swapchain";

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let config = Config::load();

    init_logging(&config)?;
    log::info!("Starting render-hal probe");
    log::info!(
        "Backend: {}, window: {}x{}, present mode: {}",
        config.renderer.backend,
        config.window.width,
        config.window.height,
        config.surface.present_mode
    );

    if config.renderer.backend != Backend::Vulkan {
        anyhow::bail!("{} backend not available", config.renderer.backend);
    }

    let instance = VulkanInstance::new(&config.renderer.app_name, config.debug.validation_layers)?;
    report_devices(&instance)?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, instance);
    event_loop.run_app(&mut app)?;

    std::mem::replace(&mut app.result, Ok(()))
}

/// Initialize logging, optionally redirected into the configured log file
fn init_logging(config: &Config) -> Result<()> {
    use env_logger::{Builder, Target};

    let mut builder = Builder::from_default_env();
    builder.filter_level(config.log_level());

    if config.debug.log_to_file {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.debug.log_file)
            .with_context(|| format!("Failed to open log file: {}", config.debug.log_file))?;

        writeln!(file, "=== render-hal probe log ===")?;
        writeln!(file, "Started: {:?}", std::time::SystemTime::now())?;
        writeln!(file)?;

        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn report_devices(instance: &VulkanInstance) -> Result<()> {
    log::info!(
        "Instance: {} layers, {} extensions available, {} enabled",
        instance.layers.len(),
        instance.extensions.len(),
        instance.enabled_extensions.len()
    );

    let driver = instance.driver();
    let devices = query_physical_devices(&driver, instance.handle())?;
    log::info!("Found {} physical device(s)", devices.len());

    for device in devices {
        let props = driver
            .physical_device_properties(device)
            .context("Vulkan instance functions are not loaded")?;
        let extensions = query_device_extensions(&driver, device)?;
        log::info!(
            "  {:?} {}: {} device extensions",
            props.device_type,
            fixed_str(&props.device_name),
            extensions.len()
        );
        for extension in &extensions {
            log::debug!("    {}", extension);
        }
    }

    Ok(())
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Field order matters for Drop: the surface goes before the instance.
struct App {
    config: Config,
    window: Option<Arc<Window>>,
    surface: Option<vk::SurfaceKHR>,
    context: Option<ContextState>,
    instance: VulkanInstance,
    result: Result<()>,
}

impl App {
    fn new(config: Config, instance: VulkanInstance) -> Self {
        Self {
            config,
            window: None,
            surface: None,
            context: None,
            instance,
            result: Ok(()),
        }
    }

    /// Pick a device for the window's surface and log the negotiated parameters
    fn negotiate(&mut self, window: &Window) -> Result<()> {
        let surface = self.instance.create_surface(window)?;
        self.surface = Some(surface);

        let driver = self.instance.driver();
        let requirements = DeviceRequirements {
            extensions: &[SWAPCHAIN_EXTENSION],
            surface: Some(surface),
        };
        let device = select_physical_device(&driver, self.instance.handle(), &requirements)?;
        log::info!(
            "Selected {} ({:?}, Vulkan {})",
            device.name,
            device.device_type,
            device.api_version_string()
        );

        let extent = self.report_surface(&device, window)?;
        self.report_context(extent);
        Ok(())
    }

    fn report_surface(&self, device: &PhysicalDeviceInfo, window: &Window) -> Result<vk::Extent2D> {
        let support = device
            .surface_support
            .as_ref()
            .context("Selected device has no surface support details")?;

        let format = support
            .choose_format(self.config.surface.prefer_srgb)
            .context("Surface reports no formats")?;
        let present_mode = support.choose_present_mode(self.config.get_present_mode());
        let size = window.inner_size();
        let extent = support.choose_extent(size.width, size.height);
        let images = support.image_count_range();

        log::info!(
            "Surface: {:?}/{:?}, present mode {:?}",
            format.format,
            format.color_space,
            present_mode
        );
        log::info!(
            "Extent {}x{}, {} images (supported {}..={})",
            extent.width,
            extent.height,
            support.choose_image_count(),
            images.min,
            images.max
        );

        if present_mode != self.config.get_present_mode() {
            log::warn!(
                "Present mode {} not supported, using {:?}",
                self.config.surface.present_mode,
                present_mode
            );
        }

        Ok(extent)
    }

    /// Build the context state and show what a bound render target would receive
    fn report_context(&mut self, extent: vk::Extent2D) {
        let mut context = ContextState::with_state(self.config.dependent_state());

        let target = VulkanTexture::new(
            vk::Image::null(),
            TextureDescriptor {
                texture_type: TextureType::Texture2D,
                format: vk::Format::B8G8R8A8_SRGB,
                extent: Extent3d::new(extent.width, extent.height, 1),
                layers: 1,
            },
        );
        let texture = decorate(&target, self.config.debug.debug_layer);
        let mips = texture.descriptor().full_mip_count();
        log::info!(
            "Render target {}x{}: {} mip levels, smallest {:?}, debug layer {}",
            extent.width,
            extent.height,
            mips,
            texture.query_mip_level_size(mips.saturating_sub(1)),
            if texture.debug_state().is_some() { "on" } else { "off" }
        );

        let viewport = context.resolve_viewport(
            Viewport::new(0.0, 0.0, extent.width as f32, extent.height as f32 / 2.0),
            extent.height as f32,
        );
        let scissor = context.resolve_scissor(Scissor::new(0, 0, extent.width, extent.height / 2), extent.height);
        log::info!("Top-half viewport as submitted: {:?}", viewport);
        log::debug!("Top-half scissor as submitted: {:?}", scissor);

        context.notify_bound();
        log::info!("Context state for {}: {:?}", context.backend(), context.active_variant());
        self.context = Some(context);
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.result = Err(error);
        event_loop.exit();
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::anyhow!("Failed to create window: {}", e));
                return;
            }
        };

        if let Err(e) = self.negotiate(&window) {
            self.fail(event_loop, e.context("Surface negotiation failed"));
            return;
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed() && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    log::info!("ESC pressed, exiting...");
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

impl Drop for App {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            unsafe { self.instance.surface_loader.destroy_surface(surface, None) };
        }

        if let Some(context) = &self.context {
            log::debug!("Released {} context", context.backend());
        }
        log::info!("Cleanup complete");
    }
}

