//! Boot progress messages
//!
//! Console text shown while booting: the device about to be tried and, when
//! the attempt fails, why. Nothing here influences which device is tried
//! next, but an unknown device type is a configuration error and aborts.

use core::fmt::{self, Write};

use crate::boot_stage::boot_table::{DESCRIPTION_LEN, IPL_TYPE_BEV, IplEntry};
use crate::error::{BootError, Result};

/// Display names indexed by device type (BEV shown as type 4)
pub const DRIVE_TYPES: [&str; 5] = ["", "Floppy", "Hard Disk", "CD-Rom", "Network"];

const NETWORK_TYPE: u16 = 4;

/// Why a disk boot attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Sector read but the boot signature is missing
    NotBootable,
    /// The device could not be read
    ReadError,
}

/// Printable name of a boot device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescription {
    label: &'static str,
    product: Option<[u8; DESCRIPTION_LEN]>,
}

impl DeviceDescription {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Product string bytes up to the first NUL
    pub fn product(&self) -> Option<&[u8]> {
        self.product.as_ref().map(|bytes| {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(DESCRIPTION_LEN);
            &bytes[..end]
        })
    }
}

impl fmt::Display for DeviceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)?;
        if let Some(product) = self.product() {
            f.write_str(" [")?;
            for &byte in product {
                let ch = if byte.is_ascii_graphic() || byte == b' ' {
                    byte as char
                } else {
                    '.'
                };
                f.write_char(ch)?;
            }
            f.write_char(']')?;
        }
        Ok(())
    }
}

/// Describe an IPL entry
pub fn describe(entry: &IplEntry) -> Result<DeviceDescription> {
    let kind = if entry.kind == IPL_TYPE_BEV {
        NETWORK_TYPE
    } else {
        entry.kind
    };
    if kind == 0 || kind > NETWORK_TYPE {
        log::error!("Bad drive type {:#x}", entry.kind);
        return Err(BootError::BadDriveType(entry.kind));
    }

    let product = match entry.description {
        Some(source) if kind == NETWORK_TYPE => {
            // Only the first 32 bytes are significant.
            let mut buf = [0u8; DESCRIPTION_LEN];
            let len = source.len().min(DESCRIPTION_LEN);
            buf[..len].copy_from_slice(&source[..len]);
            Some(buf)
        }
        _ => None,
    };

    Ok(DeviceDescription {
        label: DRIVE_TYPES[kind as usize],
        product,
    })
}

/// Failure text for a disk-class device (floppy, hard disk, CD-ROM)
pub fn describe_failure(kind: u16, reason: FailureReason) -> Result<&'static str> {
    if kind == 0 || kind > 3 {
        log::error!("Bad drive type {:#x} in failure report", kind);
        return Err(BootError::BadDriveType(kind));
    }
    Ok(match reason {
        FailureReason::NotBootable => "not a bootable disk",
        FailureReason::ReadError => "could not read the boot disk",
    })
}

pub fn print_boot_device(console: &mut dyn Write, entry: &IplEntry) -> Result {
    let description = describe(entry)?;
    let _ = writeln!(console, "Booting from {}...", description);
    Ok(())
}

pub fn print_boot_failure(console: &mut dyn Write, kind: u16, reason: FailureReason) -> Result {
    let message = describe_failure(kind, reason)?;
    let _ = writeln!(console, "Boot failed: {}\n", message);
    Ok(())
}

pub fn print_cdrom_failure(console: &mut dyn Write, status: u16) {
    let _ = writeln!(console, "CDROM boot failure code : {:04x}", status);
}
