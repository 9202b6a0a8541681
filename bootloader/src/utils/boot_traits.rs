//! Core bootloader traits for dependency injection
//!
//! The boot path talks to the rest of the firmware only through these
//! interfaces: the real mode runtime that marshals registers for `INT` and
//! far calls, the persistent BIOS data area, and the CD-ROM emulation setup.

use core::fmt;

use crate::bios::bios_realmode::RealModeContext;

/// Real mode call interface
#[cfg_attr(test, mockall::automock)]
pub trait RealModeRuntime {
    /// Issue `INT vector`; registers are read from and written back to `ctx`
    fn call16_int(&mut self, vector: u8, ctx: &mut RealModeContext);

    /// Far call to `ctx.cs:ctx.ip`
    ///
    /// Returns only if the called code hands control back.
    fn call16(&mut self, ctx: &mut RealModeContext);

    /// Read a little-endian word at `segment:offset`
    fn read_far_u16(&self, segment: u16, offset: u16) -> u16;
}

/// CD-ROM emulation results published by the El Torito setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CdEmulation {
    pub emulated_drive: u8,
    pub load_segment: u16,
}

/// Persistent BIOS data area (EBDA) interface
#[cfg_attr(test, mockall::automock)]
pub trait BiosDataArea {
    /// Boot attempts since the last INT 19h
    fn boot_sequence(&self) -> u16;
    fn set_boot_sequence(&self, sequence: u16);

    /// Emulation state written by the CD-ROM boot procedure
    fn cdemu(&self) -> CdEmulation;
}

/// CD-ROM boot emulation interface
#[cfg_attr(test, mockall::automock)]
pub trait CdromBoot {
    /// Set up drive emulation from the boot catalog; 0 means success
    fn cdrom_boot(&mut self) -> u16;
}

/// Firmware services used by one boot attempt
pub struct BootServices<'a> {
    pub runtime: &'a mut dyn RealModeRuntime,
    pub ebda: &'a dyn BiosDataArea,
    pub cdrom: &'a mut dyn CdromBoot,
    pub console: &'a mut dyn fmt::Write,
}

impl<'a> BootServices<'a> {
    pub fn new(
        runtime: &'a mut dyn RealModeRuntime,
        ebda: &'a dyn BiosDataArea,
        cdrom: &'a mut dyn CdromBoot,
        console: &'a mut dyn fmt::Write,
    ) -> Self {
        Self {
            runtime,
            ebda,
            cdrom,
            console,
        }
    }
}
