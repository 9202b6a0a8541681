//! Bootloader error handling
//!
//! Errors in this module are fatal: they end the boot attempt sequence and
//! the firmware halts with the error's description. Recoverable outcomes of a
//! single boot attempt (read failures, missing signatures, skipped slots) are
//! plain values, see [`crate::boot_stage::boot_dispatch::BootOutcome`].

use core::fmt;

/// Bootloader error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// INT 18h/19h boot support was compiled out
    BootNotSupported,

    /// No device at the first priority, or the priority list ran out
    NoBootableDevice,

    /// IPL entry type outside the known device classes
    BadDriveType(u16),
}

impl BootError {
    /// Convert to an error code suitable for passing to firmware/OS
    pub fn as_error_code(&self) -> u32 {
        match self {
            BootError::BootNotSupported => 0xF001,
            BootError::NoBootableDevice => 0x6000,
            BootError::BadDriveType(kind) => 0xA000 | (*kind as u32 & 0x0FFF),
        }
    }

    /// Get a human-readable description of the error
    pub fn description(&self) -> &'static str {
        match self {
            BootError::BootNotSupported => "Boot support not compiled in.",
            BootError::NoBootableDevice => "No bootable device.",
            BootError::BadDriveType(_) => "Bad drive type",
        }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::BadDriveType(kind) => {
                write!(f, "{} ({:#x})", self.description(), kind)
            }
            _ => f.write_str(self.description()),
        }
    }
}

/// Result type used throughout the bootloader
pub type Result<T = ()> = core::result::Result<T, BootError>;
