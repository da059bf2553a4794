// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.

use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::path::Path;

use crate::context::{Backend, BackendDependentState, OpenGlDependentState};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub window: WindowConfig,
    pub surface: SurfaceConfig,
    pub debug: DebugConfig,
}

/// Backend selection
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub app_name: String,
    pub backend: Backend,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "render-hal".to_string(),
            backend: Backend::Vulkan,
        }
    }
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "render-hal probe".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Swap chain preferences used during surface negotiation
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub present_mode: String,
    pub prefer_srgb: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            present_mode: "fifo".to_string(),
            prefer_srgb: true,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    /// Wrap resources in debug decorators
    pub debug_layer: bool,
    /// OpenGL only: lower-left viewport origin
    pub flip_viewport_vertical: bool,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            debug_layer: cfg!(debug_assertions),
            flip_viewport_vertical: false,
            log_level: "info".to_string(),
            log_to_file: false,
            log_file: "render_hal.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get present mode as Vulkan enum
    pub fn get_present_mode(&self) -> vk::PresentModeKHR {
        match self.surface.present_mode.to_lowercase().as_str() {
            "immediate" => vk::PresentModeKHR::IMMEDIATE,
            "mailbox" => vk::PresentModeKHR::MAILBOX,
            "fifo" => vk::PresentModeKHR::FIFO,
            "fifo_relaxed" => vk::PresentModeKHR::FIFO_RELAXED,
            _ => {
                log::warn!(
                    "Unknown present mode '{}', defaulting to FIFO",
                    self.surface.present_mode
                );
                vk::PresentModeKHR::FIFO
            }
        }
    }

    /// Backend-dependent state requested by this config
    pub fn dependent_state(&self) -> BackendDependentState {
        match self.renderer.backend {
            Backend::OpenGl => BackendDependentState::OpenGl(OpenGlDependentState {
                flip_viewport_vertical: self.debug.flip_viewport_vertical,
            }),
            backend => {
                if self.debug.flip_viewport_vertical {
                    log::warn!("flip_viewport_vertical has no effect on the {} backend", backend);
                }
                BackendDependentState::default_for(backend)
            }
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.debug.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info", self.debug.log_level);
            log::LevelFilter::Info
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.renderer.backend, Backend::Vulkan);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.get_present_mode(), vk::PresentModeKHR::FIFO);
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [renderer]
            backend = "opengl"

            [surface]
            present_mode = "Mailbox"

            [debug]
            flip_viewport_vertical = true
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.renderer.app_name, "render-hal");
        assert_eq!(config.get_present_mode(), vk::PresentModeKHR::MAILBOX);
        assert!(config.surface.prefer_srgb);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
        assert_eq!(
            config.dependent_state(),
            BackendDependentState::OpenGl(OpenGlDependentState {
                flip_viewport_vertical: true
            })
        );
    }

    #[test]
    fn test_flip_is_ignored_for_vulkan() {
        let config = Config::parse("[debug]\nflip_viewport_vertical = true\n").unwrap();
        assert_eq!(config.dependent_state(), BackendDependentState::default_for(Backend::Vulkan));
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let config = Config::parse("[surface]\npresent_mode = \"vsync-ish\"\n[debug]\nlog_level = \"loud\"\n").unwrap();
        assert_eq!(config.get_present_mode(), vk::PresentModeKHR::FIFO);
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_bad_backend_is_an_error() {
        assert!(Config::parse("[renderer]\nbackend = \"metal\"\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.window.height, 600);
    }
}
