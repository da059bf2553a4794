// Context module - per-context state shared by every backend

pub mod state;
pub mod types;

pub use state::{
    Backend, BackendDependentState, ContextState, OpenGlDependentState, VulkanDependentState,
};
pub use types::{ClearBuffersFlags, Scissor, Viewport};
