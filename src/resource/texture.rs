// Textures - the capability interface and the concrete Vulkan resource
//
// A texture's descriptor is fixed at creation. VulkanTexture wraps an image
// handle created and destroyed by the device owner; it never frees it.

use ash::vk;

use crate::debug::DebugTextureState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
    Texture1DArray,
    Texture2DArray,
    TextureCubeArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3d {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

impl From<Extent3d> for vk::Extent3D {
    fn from(extent: Extent3d) -> Self {
        vk::Extent3D {
            width: extent.width,
            height: extent.height,
            depth: extent.depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub texture_type: TextureType,
    pub format: vk::Format,
    /// Size of mip level 0. Unused dimensions are 1.
    pub extent: Extent3d,
    /// Array layers (6 per cube for cube types)
    pub layers: u32,
}

impl TextureDescriptor {
    /// Number of levels in a full mip chain for this descriptor
    pub fn full_mip_count(&self) -> u32 {
        let largest = match self.texture_type {
            TextureType::Texture1D | TextureType::Texture1DArray => self.extent.width,
            TextureType::Texture3D => self
                .extent
                .width
                .max(self.extent.height)
                .max(self.extent.depth),
            _ => self.extent.width.max(self.extent.height),
        };
        u32::BITS - largest.max(1).leading_zeros()
    }
}

/// Operations every texture exposes, plain or decorated
pub trait Texture {
    fn texture_type(&self) -> TextureType;

    fn descriptor(&self) -> &TextureDescriptor;

    /// Size of the given mip level; array layers are not reduced
    fn query_mip_level_size(&self, mip_level: u32) -> Extent3d;

    /// Debug-layer bookkeeping, present only on decorated textures
    fn debug_state(&self) -> Option<&DebugTextureState> {
        None
    }

    fn debug_state_mut(&mut self) -> Option<&mut DebugTextureState> {
        None
    }
}

impl<T: Texture + ?Sized> Texture for &T {
    fn texture_type(&self) -> TextureType {
        (**self).texture_type()
    }

    fn descriptor(&self) -> &TextureDescriptor {
        (**self).descriptor()
    }

    fn query_mip_level_size(&self, mip_level: u32) -> Extent3d {
        (**self).query_mip_level_size(mip_level)
    }

    fn debug_state(&self) -> Option<&DebugTextureState> {
        (**self).debug_state()
    }
}

/// Image-backed texture
#[derive(Debug)]
pub struct VulkanTexture {
    image: vk::Image,
    desc: TextureDescriptor,
}

impl VulkanTexture {
    pub fn new(image: vk::Image, desc: TextureDescriptor) -> Self {
        Self { image, desc }
    }

    pub fn image(&self) -> vk::Image {
        self.image
    }
}

fn mip_dimension(size: u32, mip_level: u32) -> u32 {
    size.checked_shr(mip_level).unwrap_or(0).max(1)
}

impl Texture for VulkanTexture {
    fn texture_type(&self) -> TextureType {
        self.desc.texture_type
    }

    fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    fn query_mip_level_size(&self, mip_level: u32) -> Extent3d {
        let Extent3d {
            width,
            height,
            depth,
        } = self.desc.extent;
        let layers = self.desc.layers.max(1);

        match self.desc.texture_type {
            TextureType::Texture1D => Extent3d::new(mip_dimension(width, mip_level), 1, 1),
            TextureType::Texture1DArray => Extent3d::new(mip_dimension(width, mip_level), layers, 1),
            TextureType::Texture2D | TextureType::TextureCube => Extent3d::new(
                mip_dimension(width, mip_level),
                mip_dimension(height, mip_level),
                1,
            ),
            TextureType::Texture2DArray | TextureType::TextureCubeArray => Extent3d::new(
                mip_dimension(width, mip_level),
                mip_dimension(height, mip_level),
                layers,
            ),
            TextureType::Texture3D => Extent3d::new(
                mip_dimension(width, mip_level),
                mip_dimension(height, mip_level),
                mip_dimension(depth, mip_level),
            ),
        }
    }
}
