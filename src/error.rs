// Error types for the abstraction layer
//
// HalError covers everything a backend query can fail with. StateError is a
// usage error raised by the context layer and never comes from the driver.

use std::borrow::Cow;

use ash::vk;
use thiserror::Error;

use crate::backend::result::{self, StatusCategory};
use crate::context::Backend;

/// Failure of a backend call or of validating what the backend reported
#[derive(Debug, Error)]
pub enum HalError {
    #[error("{context} (error code = {})", diagnostic(.code))]
    Backend { context: String, code: vk::Result },

    #[error("{context} (driver reported {expected} entries, then filled {actual})")]
    CountMismatch {
        context: String,
        expected: u32,
        actual: u32,
    },

    #[error("{context} (minimum {min} exceeds maximum {max})")]
    InvalidRange { context: String, min: u32, max: u32 },

    #[error("viewport depth range is inverted or not a number (min {min}, max {max})")]
    InvalidDepthRange { min: f32, max: f32 },

    #[error("{0} is not loaded")]
    MissingFunctions(&'static str),

    #[error("no suitable physical device found among {candidates} candidates")]
    NoSuitableDevice { candidates: usize },
}

impl HalError {
    pub fn backend(context: impl Into<String>, code: vk::Result) -> Self {
        HalError::Backend {
            context: context.into(),
            code,
        }
    }

    /// Normalized outcome class of this failure
    pub fn category(&self) -> StatusCategory {
        match self {
            HalError::Backend { code, .. } => result::classify(*code),
            HalError::CountMismatch { .. }
            | HalError::InvalidRange { .. }
            | HalError::InvalidDepthRange { .. }
            | HalError::NoSuitableDevice { .. } => StatusCategory::CapabilityMismatch,
            HalError::MissingFunctions(_) => StatusCategory::DeviceFailure,
        }
    }

    /// Raw status code, when the failure came straight from the driver
    pub fn code(&self) -> Option<vk::Result> {
        match self {
            HalError::Backend { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn diagnostic(code: &vk::Result) -> Cow<'static, str> {
    result::translate(*code)
}

/// Misuse of the backend-dependent state escape hatch
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("backend-dependent state cannot change after a resource or pipeline has been bound")]
    AlreadyBound,

    #[error("requested {requested} state, but the context runs the {active} backend")]
    BackendMismatch { requested: Backend, active: Backend },
}
