// Pass-through descriptors for viewports, scissors and clears
//
// Screen space, origin in the top-left corner. These are handed to the
// backend as-is; only the OpenGL flip in ContextState rewrites them.

use ash::vk;
use bitflags::bitflags;

use crate::error::HalError;

bitflags! {
    /// Buffers cleared by a clear command
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ClearBuffersFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

impl ClearBuffersFlags {
    pub fn aspect_mask(self) -> vk::ImageAspectFlags {
        let mut mask = vk::ImageAspectFlags::empty();
        if self.contains(Self::COLOR) {
            mask |= vk::ImageAspectFlags::COLOR;
        }
        if self.contains(Self::DEPTH) {
            mask |= vk::ImageAspectFlags::DEPTH;
        }
        if self.contains(Self::STENCIL) {
            mask |= vk::ImageAspectFlags::STENCIL;
        }
        mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    /// Must be set before use
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Fails unless `min_depth <= max_depth`; NaN bounds fail too
    pub fn with_depth_range(mut self, min_depth: f32, max_depth: f32) -> Result<Self, HalError> {
        if !(min_depth <= max_depth) {
            return Err(HalError::InvalidDepthRange {
                min: min_depth,
                max: max_depth,
            });
        }
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        Ok(self)
    }

    pub fn has_valid_depth_range(&self) -> bool {
        self.min_depth <= self.max_depth
    }

    /// Same rectangle measured from the bottom-left corner of a target `target_height` tall
    pub fn flipped_vertical(self, target_height: f32) -> Self {
        Self {
            y: target_height - self.y - self.height,
            ..self
        }
    }
}

impl From<Viewport> for vk::Viewport {
    fn from(vp: Viewport) -> Self {
        vk::Viewport {
            x: vp.x,
            y: vp.y,
            width: vp.width,
            height: vp.height,
            min_depth: vp.min_depth,
            max_depth: vp.max_depth,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Scissor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Scissor {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn flipped_vertical(self, target_height: u32) -> Self {
        let y = i64::from(target_height) - i64::from(self.y) - i64::from(self.height);
        Self {
            y: y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            ..self
        }
    }
}

impl From<Scissor> for vk::Rect2D {
    fn from(scissor: Scissor) -> Self {
        vk::Rect2D {
            offset: vk::Offset2D {
                x: scissor.x,
                y: scissor.y,
            },
            extent: vk::Extent2D {
                width: scissor.width,
                height: scissor.height,
            },
        }
    }
}
