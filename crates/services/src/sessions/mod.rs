mod config;
mod countdown;
mod manager;
mod progress;
mod state;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::AssessmentServiceError;
pub use config::{ManagerConfig, TimeoutPolicy};
pub use manager::AssessmentSessionManager;
pub use progress::SessionProgress;
pub use state::SessionSnapshot;
pub use workflow::{AssessmentService, ensure_attempts_remaining};
