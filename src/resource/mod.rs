// Resource module - backend resources behind capability traits

pub mod texture;

pub use texture::{Extent3d, Texture, TextureDescriptor, TextureType, VulkanTexture};
