//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod settings_repo;
pub mod video_repo;

pub use settings_repo::SettingsRepo;
pub use video_repo::VideoRepo;
