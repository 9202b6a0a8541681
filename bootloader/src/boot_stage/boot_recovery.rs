//! Boot Recovery System
//!
//! INT 19h starts a boot at priority 0. Every attempt that does not leave
//! the firmware ends in INT 18h, whose handler advances the attempt counter
//! held in the EBDA and tries the next priority. The loop over priorities
//! therefore runs through the interrupt dispatcher, one step per interrupt:
//!
//! ```text
//! INT 19h -> handle_19 -> do_boot(0) -> INT 18h
//! INT 18h -> handle_18 -> do_boot(1) -> INT 18h
//! INT 18h -> handle_18 -> do_boot(2) -> ...
//! ```
//!
//! The free [`handle_19`] and [`handle_18`] are the interrupt vectors' entry
//! points and run over the table published by `install_ipl_table`. Hosts
//! without an interrupt dispatcher use [`BootRecovery::run_boot_sequence`].

use crate::bios::bios_int_executor::{BIOSInterruptExecutor, INT18_BOOT_FAILURE, INT19_BOOT_LOAD};
use crate::boot_stage::boot_config::CONFIG_BOOT;
use crate::boot_stage::boot_dispatch::{BootDispatcher, BootOutcome, JumpTarget, SkipReason};
use crate::boot_stage::boot_table::{BOOT_ORDER_SLOTS, IplTable, LookupError, ipl_table};
use crate::error::{BootError, Result};
use crate::utils::boot_traits::BootServices;

/// Counter value for the attempt after `prev`
pub fn next_boot_sequence(prev: u16) -> u16 {
    prev.saturating_add(1)
}

/// INT 19h entry over the installed IPL table
pub fn handle_19(services: BootServices<'_>) -> Result<BootOutcome> {
    with_installed_table(services)?.handle_19()
}

/// INT 18h entry over the installed IPL table
pub fn handle_18(services: BootServices<'_>) -> Result<BootOutcome> {
    with_installed_table(services)?.handle_18()
}

fn with_installed_table(services: BootServices<'_>) -> Result<BootRecovery<'_>> {
    match ipl_table() {
        Some(table) => Ok(BootRecovery::new(table, services)),
        None => {
            log::error!("Boot requested before the IPL table was installed");
            Err(BootError::NoBootableDevice)
        }
    }
}

/// Retry controller over an IPL table
pub struct BootRecovery<'a> {
    table: &'a IplTable,
    services: BootServices<'a>,
}

impl<'a> BootRecovery<'a> {
    pub fn new(table: &'a IplTable, services: BootServices<'a>) -> Self {
        Self { table, services }
    }

    /// INT 19h: boot from the highest priority
    pub fn handle_19(&mut self) -> Result<BootOutcome> {
        log::info!("INT {:02X}h: boot load", INT19_BOOT_LOAD);
        self.services.ebda.set_boot_sequence(0);
        self.do_boot(0)
    }

    /// INT 18h: previous attempt failed, try the next priority
    pub fn handle_18(&mut self) -> Result<BootOutcome> {
        let seq = next_boot_sequence(self.services.ebda.boot_sequence());
        log::info!("INT {:02X}h: boot failure, attempt {}", INT18_BOOT_FAILURE, seq);
        self.services.ebda.set_boot_sequence(seq);
        self.do_boot(seq)
    }

    /// One attempt followed by the boot-failure interrupt
    ///
    /// Fatal errors return before INT 18h is raised.
    pub fn do_boot(&mut self, seq: u16) -> Result<BootOutcome> {
        let outcome = self.try_boot(seq)?;
        if outcome.is_transfer() {
            log::warn!("Boot code returned to the firmware");
        }
        BIOSInterruptExecutor::new(&mut *self.services.runtime).exec_boot_failure();
        Ok(outcome)
    }

    /// Resolve priority `seq` and dispatch it, without raising INT 18h
    pub fn try_boot(&mut self, seq: u16) -> Result<BootOutcome> {
        if !CONFIG_BOOT {
            log::error!("Boot support not compiled in");
            return Err(BootError::BootNotSupported);
        }

        let entry = match self.table.entry_at(seq) {
            Ok(entry) => *entry,
            Err(LookupError::InvalidSlot(index)) => {
                log::debug!("Invalid boot device (0x{:x})", index);
                return Ok(BootOutcome::Skipped(SkipReason::InvalidSlot(index)));
            }
            Err(LookupError::EmptySlot(priority)) => {
                log::debug!("Nothing configured at priority {}", priority);
                return Ok(BootOutcome::Skipped(SkipReason::EmptySlot(priority)));
            }
            Err(err) => {
                log::error!("No bootable device ({:?})", err);
                return Err(BootError::NoBootableDevice);
            }
        };

        let check_floppy_sig = self.table.check_floppy_sig();
        BootDispatcher::new(&mut self.services).attempt(&entry, check_floppy_sig)
    }

    /// Try every priority in order within one call
    ///
    /// Stops at the first transfer whose callee handed control back.
    pub fn run_boot_sequence(&mut self) -> Result<JumpTarget> {
        for seq in 0..BOOT_ORDER_SLOTS {
            self.services.ebda.set_boot_sequence(seq);
            match self.try_boot(seq)? {
                BootOutcome::Transferred(target) => return Ok(target),
                outcome => log::debug!("Priority {} gave {:?}", seq, outcome),
            }
        }
        log::error!("All {} boot priorities tried", BOOT_ORDER_SLOTS);
        Err(BootError::NoBootableDevice)
    }
}


#[cfg(all(test, not(feature = "boot")))]
mod compiled_out_tests {
    use super::*;
    use crate::boot_stage::boot_table::{BootOrder, IplEntry};
    use crate::firmware::ebda::EbdaRecord;
    use crate::utils::boot_traits::{BiosDataArea, MockCdromBoot, MockRealModeRuntime};

    #[test]
    fn test_boot_not_supported() {
        let mut table = IplTable::new(BootOrder::new(0x1), true);
        table.add(IplEntry::hard_disk()).unwrap();
        let ebda = EbdaRecord::new();
        let mut runtime = MockRealModeRuntime::new();
        runtime.expect_call16_int().never();
        runtime.expect_call16().never();
        runtime.expect_read_far_u16().never();
        let mut cdrom = MockCdromBoot::new();
        cdrom.expect_cdrom_boot().never();
        let mut console = String::new();

        let services = BootServices::new(&mut runtime, &ebda, &mut cdrom, &mut console);
        let result = BootRecovery::new(&table, services).handle_19();

        assert_eq!(result, Err(BootError::BootNotSupported));
        assert_eq!(result.unwrap_err().to_string(), "Boot support not compiled in.");
        assert!(console.is_empty());
        assert_eq!(ebda.boot_sequence(), 0);
    }
}
