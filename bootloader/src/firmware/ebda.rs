//! Extended BIOS Data Area record
//!
//! The boot attempt counter has to survive the INT 18h round trip through
//! the interrupt dispatcher, so it lives in the EBDA rather than on the
//! stack. `EbdaRecord` keeps the fields the boot path uses behind a spin
//! lock; single-threaded firmware never contends on it.

use spin::Mutex;

use crate::utils::boot_traits::{BiosDataArea, CdEmulation};

#[derive(Debug, Clone, Copy, Default)]
struct EbdaFields {
    boot_sequence: u16,
    cdemu: CdEmulation,
}

/// In-memory EBDA fields shared between the boot path and the CD-ROM code
pub struct EbdaRecord {
    fields: Mutex<EbdaFields>,
}

impl EbdaRecord {
    pub const fn new() -> Self {
        Self {
            fields: Mutex::new(EbdaFields {
                boot_sequence: 0,
                cdemu: CdEmulation {
                    emulated_drive: 0,
                    load_segment: 0,
                },
            }),
        }
    }

    /// Publish CD-ROM emulation results (called by the El Torito code)
    pub fn set_cdemu(&self, cdemu: CdEmulation) {
        log::trace!(
            "EBDA cdemu: drive {:#04x}, load segment {:#06x}",
            cdemu.emulated_drive,
            cdemu.load_segment
        );
        self.fields.lock().cdemu = cdemu;
    }
}

impl Default for EbdaRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl BiosDataArea for EbdaRecord {
    fn boot_sequence(&self) -> u16 {
        self.fields.lock().boot_sequence
    }

    fn set_boot_sequence(&self, sequence: u16) {
        self.fields.lock().boot_sequence = sequence;
    }

    fn cdemu(&self) -> CdEmulation {
        self.fields.lock().cdemu
    }
}
