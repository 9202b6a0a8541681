//! Boot Stage - IPL table, device dispatch, retry controller, reporting

pub mod boot_config;
pub mod boot_table;
pub mod boot_dispatch;
pub mod boot_recovery;
pub mod boot_report;

// Re-export commonly used types
pub use boot_config::BootConfig;
pub use boot_recovery::BootRecovery;
