//! Boot configuration and build-time switches

use log::LevelFilter;

use crate::boot_stage::boot_table::BootOrder;

/// INT 19h/18h boot support compiled in
pub const CONFIG_BOOT: bool = cfg!(feature = "boot");

/// CD-ROM boot emulation compiled in
pub const CONFIG_CDROM_BOOT: bool = cfg!(feature = "cdrom_boot");

/// CMOS register holding the floppy signature flag and the third boot device
pub const CMOS_BIOS_BOOTFLAG1: u8 = 0x38;

/// CMOS register holding the first and second boot devices
pub const CMOS_BIOS_BOOTFLAG2: u8 = 0x3D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    pub boot_order: BootOrder,
    pub check_floppy_sig: bool,
    pub log_level: LevelFilter,
}

impl BootConfig {
    pub fn new() -> Self {
        Self {
            boot_order: BootOrder::new(0),
            check_floppy_sig: true,
            log_level: default_log_level(),
        }
    }

    /// Build from the two CMOS boot flag bytes
    ///
    /// `bootflag2` supplies the first two priority nibbles, the high nibble
    /// of `bootflag1` the third. Bit 0 of `bootflag1` set disables the
    /// floppy signature check.
    pub fn from_cmos(bootflag1: u8, bootflag2: u8) -> Self {
        let order = bootflag2 as u32 | (((bootflag1 & 0xF0) as u32) << 4);
        log::debug!(
            "CMOS boot flags {:#04x}/{:#04x} -> boot order {:#05x}",
            bootflag1,
            bootflag2,
            order
        );
        Self {
            boot_order: BootOrder::new(order),
            check_floppy_sig: bootflag1 & 0x01 == 0,
            log_level: default_log_level(),
        }
    }

    pub fn with_boot_order(mut self, boot_order: BootOrder) -> Self {
        self.boot_order = boot_order;
        self
    }

    pub fn set_check_floppy_sig(&mut self, check: bool) {
        self.check_floppy_sig = check;
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_log_level() -> LevelFilter {
    if cfg!(feature = "verbose_logging") {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    }
}
