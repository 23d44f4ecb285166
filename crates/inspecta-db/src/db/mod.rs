//! Database repositories for data access layer
//!
//! `inspection` reads the owner hierarchy and guards the inspection version; `picture`
//! owns the `inspection_pictures` table, including the keyset page query.
//
// Owner hierarchy
pub mod inspection;
//
// Registered pictures
pub mod picture;
//
// Transaction utilities
pub mod transaction;

pub use inspection::InspectionRepository;
pub use picture::PictureRepository;
