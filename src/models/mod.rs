//! Data models for the visit log

pub mod user;
pub mod visit;

// Re-export commonly used types
pub use user::{Role, User, UserClaims, UserProfile};
pub use visit::{FilterCriteria, Visit, VisitStatus, VisitType};
