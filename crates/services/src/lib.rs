#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use assess_core::Clock;

pub use error::AssessmentServiceError;
pub use sessions::{
    AssessmentService, AssessmentSessionManager, ManagerConfig, SessionProgress, SessionSnapshot,
    TimeoutPolicy,
};
