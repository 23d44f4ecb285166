//! Inspecta Database Layer
//!
//! Postgres repositories for the inspection hierarchy and registered pictures, plus the
//! repository traits the service layer depends on.
//
// Module declarations
pub mod db;
pub mod repository_traits;

// Re-exports: Repositories
pub use db::{InspectionRepository, PictureRepository};

// Re-exports: Transaction utilities
pub use db::transaction::TransactionGuard;

// Re-exports: Repository traits
pub use repository_traits::{InspectionRepositoryTrait, PictureRepositoryTrait};
