//! Inspecta Services Layer
//!
//! Business services for the picture pipeline: issuing presigned upload URLs, registering
//! uploaded pictures, serving keyset-paginated galleries, picture maintenance and the
//! orphaned-object sweep. HTTP handling stays thin in inspecta-api.

pub mod maintenance;
pub mod orphan_sweep;
pub mod pagination;
pub mod presigned;
pub mod registrar;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use maintenance::PictureMaintenanceService;
pub use orphan_sweep::{OrphanSweepReport, OrphanSweepService};
pub use pagination::PaginationEngine;
pub use presigned::PresignedUrlIssuer;
pub use registrar::PictureRegistrar;

pub use inspecta_storage::{create_storage, Storage, StorageBackend, StorageError, StorageResult};
