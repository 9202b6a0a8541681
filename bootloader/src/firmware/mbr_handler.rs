//! Boot sector handling
//!
//! Constants and signature checks for the first sector of a floppy or hard
//! disk, loaded at `07C0:0000` before control is handed over.

use crate::utils::boot_traits::RealModeRuntime;

/// MBR signature (0xAA55 at offset 510-511)
pub const MBR_SIGNATURE: u16 = 0xAA55;

/// MBR signature offset
pub const MBR_SIGNATURE_OFFSET: usize = 0x1FE;

/// Segment the boot sector is read into
pub const BOOT_LOAD_SEGMENT: u16 = 0x07C0;

/// Read the signature word of a sector already loaded at `segment:0000`
pub fn read_boot_signature(runtime: &dyn RealModeRuntime, segment: u16) -> u16 {
    runtime.read_far_u16(segment, MBR_SIGNATURE_OFFSET as u16)
}

/// Check the signature of a sector already loaded at `segment:0000`
pub fn loaded_sector_is_bootable(runtime: &dyn RealModeRuntime, segment: u16) -> bool {
    let signature = read_boot_signature(runtime, segment);
    if signature != MBR_SIGNATURE {
        log::debug!(
            "Boot signature mismatch at {:04x}:{:04x}: {:#06x}",
            segment,
            MBR_SIGNATURE_OFFSET,
            signature
        );
        return false;
    }
    true
}
