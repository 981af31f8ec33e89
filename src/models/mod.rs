//! Data models for the asset tracker

pub mod asset;
pub mod audit;
pub mod enums;
pub mod loan;
pub mod maintenance;
pub mod mutation;
pub mod user;

// Re-export commonly used types
pub use asset::{Asset, AssetDetails, AssetSummary, ServiceReminder};
pub use audit::{AuditEntry, AuditLogView, NewAuditEntry};
pub use enums::{AssetStatus, AuditAction, EntityType, LoanStatus, MaintenanceType, Role};
pub use loan::Loan;
pub use maintenance::Maintenance;
pub use mutation::{Mutation, MutationWithUser};
pub use user::{User, UserClaims, UserInfo};
