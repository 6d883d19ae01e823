//! Domain logic shared by the clipstudio crates.
//!
//! Everything here is free of network and database concerns: request
//! composition, progress/stage mapping, library ordering, API-key helpers
//! and thumbnail capture through an external `ffmpeg` binary.

pub mod api_key;
pub mod composer;
pub mod error;
pub mod ffmpeg;
pub mod library;
pub mod progress;
pub mod request;
pub mod types;
