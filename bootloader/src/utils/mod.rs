//! Utility Library - collaborator traits

pub mod boot_traits;
