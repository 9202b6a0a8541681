//! Boot device dispatch
//!
//! One boot attempt for one IPL entry: announce the device, run the load
//! protocol of its class, and on success far-call the loaded code with
//! `AX = 0xAA55` and the boot drive in `DL`.
//!
//! | class     | load                               | drive        |
//! |-----------|------------------------------------|--------------|
//! | floppy    | INT 13h sector 1 to 07C0:0000      | 0x00         |
//! | hard disk | INT 13h sector 1 to 07C0:0000      | 0x80         |
//! | CD-ROM    | El Torito emulation, EBDA results  | emulated     |
//! | BEV       | none, entry vector used as is      | 0x00         |
//!
//! Hard disk sectors must carry the `55 AA` signature; floppies only when
//! the table asks for it.

use crate::bios::bios_int_executor::{BIOSInterruptExecutor, BOOT_MAGIC};
use crate::bios::bios_realmode::RealModeContext;
use crate::boot_stage::boot_config::CONFIG_CDROM_BOOT;
use crate::boot_stage::boot_report::{self, FailureReason};
use crate::boot_stage::boot_table::{IplEntry, IplType};
use crate::error::Result;
use crate::firmware::far_pointer::FarPtr;
use crate::firmware::mbr_handler::{self, BOOT_LOAD_SEGMENT};
use crate::utils::boot_traits::BootServices;

/// BIOS drive number of the first floppy
pub const FLOPPY_DRIVE: u8 = 0x00;

/// BIOS drive number of the first hard disk
pub const HARDDISK_DRIVE: u8 = 0x80;

/// Where control goes after a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
    pub target: FarPtr,
    pub drive: u8,
}

impl JumpTarget {
    pub fn new(target: FarPtr, drive: u8) -> Self {
        Self { target, drive }
    }

    /// Code loaded at `segment:0000`, entered through the canonical pointer
    pub fn loaded_at(segment: u16, drive: u8) -> Self {
        Self::new(FarPtr::new(segment, 0).canonicalize(), drive)
    }

    /// Register image for the hand-off
    pub fn registers(&self) -> RealModeContext {
        let mut ctx = RealModeContext::new();
        ctx.set_code_pointer(self.target);
        ctx.set_dl(self.drive);
        ctx.set_ax(BOOT_MAGIC);
        ctx
    }
}

/// A load that was tried and failed; reported on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// INT 13h returned with carry set
    ReadFailure,
    /// Sector loaded without the boot signature
    NoSignature,
    /// CD-ROM emulation setup returned a non-zero status
    CdromFailure(u16),
}

impl AttemptFailure {
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::NoSignature => FailureReason::NotBootable,
            Self::ReadFailure | Self::CdromFailure(_) => FailureReason::ReadError,
        }
    }
}

/// A priority passed over without trying a load; not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptySlot(u16),
    InvalidSlot(usize),
    CdromUnsupported,
    UnknownType(u16),
}

/// Result of one boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// Control was handed to the target and came back
    Transferred(JumpTarget),
    Failed(AttemptFailure),
    Skipped(SkipReason),
}

impl BootOutcome {
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transferred(_))
    }
}

/// Why `load` produced no jump target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    Failed(AttemptFailure),
    Skipped(SkipReason),
}

pub struct BootDispatcher<'s, 'a> {
    services: &'s mut BootServices<'a>,
}

impl<'s, 'a> BootDispatcher<'s, 'a> {
    pub fn new(services: &'s mut BootServices<'a>) -> Self {
        Self { services }
    }

    /// Announce, load and hand off
    ///
    /// Only a bad device type is an error; everything else is an outcome.
    pub fn attempt(&mut self, entry: &IplEntry, check_floppy_sig: bool) -> Result<BootOutcome> {
        boot_report::print_boot_device(self.services.console, entry)?;

        match self.load(entry, check_floppy_sig) {
            Ok(target) => {
                log::debug!("Booting from {}", target.target);
                self.transfer(&target);
                Ok(BootOutcome::Transferred(target))
            }
            Err(LoadError::Failed(failure)) => {
                if let AttemptFailure::CdromFailure(status) = failure {
                    boot_report::print_cdrom_failure(self.services.console, status);
                }
                let reason = failure.reason();
                boot_report::print_boot_failure(self.services.console, entry.kind, reason)?;
                Ok(BootOutcome::Failed(failure))
            }
            Err(LoadError::Skipped(reason)) => {
                log::debug!("Skipping boot entry: {:?}", reason);
                Ok(BootOutcome::Skipped(reason))
            }
        }
    }

    /// Run the class-specific load protocol without handing off
    pub fn load(
        &mut self,
        entry: &IplEntry,
        check_floppy_sig: bool,
    ) -> core::result::Result<JumpTarget, LoadError> {
        match entry.ipl_type() {
            Some(IplType::Floppy) => self.load_disk(FLOPPY_DRIVE, check_floppy_sig),
            Some(IplType::HardDisk) => self.load_disk(HARDDISK_DRIVE, true),
            Some(IplType::CdRom) => self.load_cdrom(),
            // Expansion ROMs supply a ready entry point.
            Some(IplType::Bev) => Ok(JumpTarget::new(FarPtr::from_vector(entry.vector), 0)),
            None => Err(LoadError::Skipped(SkipReason::UnknownType(entry.kind))),
        }
    }

    fn load_disk(
        &mut self,
        drive: u8,
        check_signature: bool,
    ) -> core::result::Result<JumpTarget, LoadError> {
        let mut executor = BIOSInterruptExecutor::new(&mut *self.services.runtime);
        let status = executor.exec_read_boot_sector(drive, BOOT_LOAD_SEGMENT);
        if !status.is_success() {
            log::debug!(
                "Boot sector read from drive {:#04x} failed: {}, AH={:#04x}",
                drive,
                status.as_str(),
                executor.last_ah().unwrap_or(0)
            );
            return Err(LoadError::Failed(AttemptFailure::ReadFailure));
        }

        if check_signature
            && !mbr_handler::loaded_sector_is_bootable(&*self.services.runtime, BOOT_LOAD_SEGMENT)
        {
            return Err(LoadError::Failed(AttemptFailure::NoSignature));
        }

        Ok(JumpTarget::loaded_at(BOOT_LOAD_SEGMENT, drive))
    }

    fn load_cdrom(&mut self) -> core::result::Result<JumpTarget, LoadError> {
        if !CONFIG_CDROM_BOOT {
            return Err(LoadError::Skipped(SkipReason::CdromUnsupported));
        }

        let status = self.services.cdrom.cdrom_boot();
        if status != 0 {
            return Err(LoadError::Failed(AttemptFailure::CdromFailure(status)));
        }

        let cdemu = self.services.ebda.cdemu();
        Ok(JumpTarget::loaded_at(cdemu.load_segment, cdemu.emulated_drive))
    }

    fn transfer(&mut self, target: &JumpTarget) {
        BIOSInterruptExecutor::new(&mut *self.services.runtime).exec_far_call(target.registers());
    }
}
