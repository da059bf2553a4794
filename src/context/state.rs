// Backend-dependent state - the few knobs that cannot be unified
//
// Chosen when the context is created. It may be replaced until the first
// resource or pipeline is bound; after that it is frozen.

use std::fmt;

use serde::Deserialize;

use super::types::{Scissor, Viewport};
use crate::error::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Vulkan,
    OpenGl,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Vulkan => write!(f, "Vulkan"),
            Backend::OpenGl => write!(f, "OpenGL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VulkanDependentState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenGlDependentState {
    /// Use a lower-left origin for viewports and scissors (and invert front
    /// facing) to match renderers that draw upside down into render targets.
    pub flip_viewport_vertical: bool,
}

/// Exactly one backend's knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendDependentState {
    Vulkan(VulkanDependentState),
    OpenGl(OpenGlDependentState),
}

impl BackendDependentState {
    pub fn default_for(backend: Backend) -> Self {
        match backend {
            Backend::Vulkan => BackendDependentState::Vulkan(VulkanDependentState),
            Backend::OpenGl => BackendDependentState::OpenGl(OpenGlDependentState::default()),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            BackendDependentState::Vulkan(_) => Backend::Vulkan,
            BackendDependentState::OpenGl(_) => Backend::OpenGl,
        }
    }
}

/// Per-context holder of the backend-dependent state
#[derive(Debug, Clone)]
pub struct ContextState {
    backend: Backend,
    dependent: BackendDependentState,
    bound: bool,
}

impl ContextState {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            dependent: BackendDependentState::default_for(backend),
            bound: false,
        }
    }

    /// Create a context whose backend is the one `state` belongs to
    pub fn with_state(state: BackendDependentState) -> Self {
        Self {
            backend: state.backend(),
            dependent: state,
            bound: false,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn active_variant(&self) -> BackendDependentState {
        self.dependent
    }

    pub fn set_dependent_state(&mut self, state: BackendDependentState) -> Result<(), StateError> {
        if self.bound {
            return Err(StateError::AlreadyBound);
        }
        if state.backend() != self.backend {
            return Err(StateError::BackendMismatch {
                requested: state.backend(),
                active: self.backend,
            });
        }

        log::debug!("Backend-dependent state set: {:?}", state);
        self.dependent = state;
        Ok(())
    }

    /// Record that a resource or pipeline was bound, freezing the state
    pub fn notify_bound(&mut self) {
        if !self.bound {
            log::trace!("First bind on {} context; dependent state frozen", self.backend);
        }
        self.bound = true;
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn opengl(&self) -> Result<&OpenGlDependentState, StateError> {
        match &self.dependent {
            BackendDependentState::OpenGl(state) => Ok(state),
            other => Err(StateError::BackendMismatch {
                requested: Backend::OpenGl,
                active: other.backend(),
            }),
        }
    }

    pub fn vulkan(&self) -> Result<&VulkanDependentState, StateError> {
        match &self.dependent {
            BackendDependentState::Vulkan(state) => Ok(state),
            other => Err(StateError::BackendMismatch {
                requested: Backend::Vulkan,
                active: other.backend(),
            }),
        }
    }

    fn flips_vertical(&self) -> bool {
        matches!(
            self.dependent,
            BackendDependentState::OpenGl(OpenGlDependentState {
                flip_viewport_vertical: true
            })
        )
    }

    /// Viewport as the backend should receive it for a target `target_height` tall
    pub fn resolve_viewport(&self, viewport: Viewport, target_height: f32) -> Viewport {
        if self.flips_vertical() {
            viewport.flipped_vertical(target_height)
        } else {
            viewport
        }
    }

    pub fn resolve_scissor(&self, scissor: Scissor, target_height: u32) -> Scissor {
        if self.flips_vertical() {
            scissor.flipped_vertical(target_height)
        } else {
            scissor
        }
    }
}
