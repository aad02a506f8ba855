//! Fragment data model: the entity itself and the type catalog that governs
//! which representations it can take.

pub mod catalog;
pub mod fragment;

pub use catalog::{ContentType, TargetFormat};
pub use fragment::Fragment;
