// Debug texture - forwarding wrapper used by the debug layer
//
// DebugTexture borrows the texture it decorates, so it can never outlive
// it. Queries go to the wrapped texture untouched; the debug state lives
// only in the wrapper.

use crate::resource::{Extent3d, Texture, TextureDescriptor, TextureType};

/// Bookkeeping the debug layer keeps per texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugTextureState {
    /// Mip levels known to hold defined contents
    pub mip_levels: u32,
    pub label: Option<String>,
}

impl Default for DebugTextureState {
    fn default() -> Self {
        Self {
            mip_levels: 1,
            label: None,
        }
    }
}

pub struct DebugTexture<'a> {
    instance: &'a dyn Texture,
    desc: TextureDescriptor,
    state: DebugTextureState,
}

impl<'a> DebugTexture<'a> {
    pub fn new(instance: &'a dyn Texture) -> Self {
        Self {
            instance,
            desc: *instance.descriptor(),
            state: DebugTextureState::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.state.label = Some(label.into());
        self
    }

    /// The decorated texture
    pub fn instance(&self) -> &'a dyn Texture {
        self.instance
    }

    pub fn state(&self) -> &DebugTextureState {
        &self.state
    }

    /// Mark the whole mip chain as generated
    pub fn record_mip_generation(&mut self) {
        self.state.mip_levels = self.desc.full_mip_count();
        log::debug!(
            "{}: generated {} mip levels",
            self.display_name(),
            self.state.mip_levels
        );
    }

    fn display_name(&self) -> &str {
        self.state.label.as_deref().unwrap_or("texture")
    }
}

impl Texture for DebugTexture<'_> {
    fn texture_type(&self) -> TextureType {
        self.instance.texture_type()
    }

    fn descriptor(&self) -> &TextureDescriptor {
        self.instance.descriptor()
    }

    fn query_mip_level_size(&self, mip_level: u32) -> Extent3d {
        if mip_level >= self.desc.full_mip_count() {
            log::warn!(
                "{}: mip level {} is outside the {}-level mip chain",
                self.display_name(),
                mip_level,
                self.desc.full_mip_count()
            );
        } else if mip_level >= self.state.mip_levels {
            log::warn!(
                "{}: mip level {} queried before mips were generated ({} defined)",
                self.display_name(),
                mip_level,
                self.state.mip_levels
            );
        }

        self.instance.query_mip_level_size(mip_level)
    }

    fn debug_state(&self) -> Option<&DebugTextureState> {
        Some(&self.state)
    }

    fn debug_state_mut(&mut self) -> Option<&mut DebugTextureState> {
        Some(&mut self.state)
    }
}

/// Wrap `texture` for the debug layer when `enabled`, else pass it through.
///
/// Callers hold the result as `dyn Texture` either way.
pub fn decorate<'a>(texture: &'a dyn Texture, enabled: bool) -> Box<dyn Texture + 'a> {
    if enabled {
        Box::new(DebugTexture::new(texture))
    } else {
        Box::new(texture)
    }
}
