// =============================================================================
// RENDER HAL - Graphics hardware abstraction layer
// =============================================================================
//
// Backend-neutral resource interfaces over a Vulkan implementation:
//
//   backend   status translation, capability probing, surface negotiation
//   resource  textures behind the `Texture` capability trait
//   debug     decorators that add validation without changing behaviour
//   context   pass-through descriptors and backend-dependent state
//
// The crate creates no devices or swapchains of its own; it answers what
// the driver supports and hands negotiated parameters to the caller.

pub mod backend;
pub mod config;
pub mod context;
pub mod debug;
pub mod error;
pub mod resource;

pub use config::Config;
pub use context::{Backend, BackendDependentState, ContextState};
pub use debug::{decorate, DebugTexture};
pub use error::{HalError, StateError};
pub use resource::{Texture, TextureDescriptor, TextureType, VulkanTexture};
