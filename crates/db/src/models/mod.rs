//! Row structs and insert DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts, where the table accepts inserts from callers

pub mod setting;
pub mod video;
