pub mod health;
pub mod picture_maintenance;
pub mod picture_page;
pub mod picture_upload;
