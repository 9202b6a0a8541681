//! BIOS Interrupt Execution Engine
//!
//! Typed requests for the three real mode services the boot path needs:
//! the INT 13h sector read, the INT 18h boot-failure notification and the
//! far call that hands control to a loaded boot sector or expansion ROM.

use crate::bios::bios_realmode::RealModeContext;
use crate::firmware::far_pointer::FarPtr;
use crate::utils::boot_traits::RealModeRuntime;

/// Disk services
pub const INT13_DISK: u8 = 0x13;

/// Boot failure recovery
pub const INT18_BOOT_FAILURE: u8 = 0x18;

/// Boot load service
pub const INT19_BOOT_LOAD: u8 = 0x19;

/// Value placed in AX when jumping to a boot sector
pub const BOOT_MAGIC: u16 = 0xAA55;

/// BIOS interrupt execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Success,
    CarryFlagSet,
}

impl ExecStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::CarryFlagSet => "Carry flag set (error)",
        }
    }
}

/// BIOS interrupt executor
pub struct BIOSInterruptExecutor<'a> {
    runtime: &'a mut dyn RealModeRuntime,
    last_context: Option<RealModeContext>,
}

impl<'a> BIOSInterruptExecutor<'a> {
    /// Create new BIOS interrupt executor
    pub fn new(runtime: &'a mut dyn RealModeRuntime) -> Self {
        Self {
            runtime,
            last_context: None,
        }
    }

    /// Execute BIOS interrupt
    pub fn execute(&mut self, int_num: u8, ctx: &mut RealModeContext) -> ExecStatus {
        self.runtime.call16_int(int_num, ctx);

        // Store context for later inspection
        self.last_context = Some(*ctx);

        // Check carry flag (generic error indicator for many BIOS calls)
        if ctx.is_carry_set() {
            ExecStatus::CarryFlagSet
        } else {
            ExecStatus::Success
        }
    }

    /// Execute disk read interrupt (INT 0x13, AH=02)
    ///
    /// Sectors land at `buffer`; `sector` is 1-based.
    pub fn exec_disk_read(
        &mut self,
        drive: u8,
        cylinder: u16,
        head: u8,
        sector: u8,
        sectors_count: u8,
        buffer: FarPtr,
    ) -> ExecStatus {
        log::debug!(
            "INT 13h read: drive {:#04x} c/h/s {}/{}/{} count {} -> {}",
            drive,
            cylinder,
            head,
            sector,
            sectors_count,
            buffer
        );
        let mut ctx = RealModeContext::new();

        ctx.set_ah(0x02);
        ctx.set_al(sectors_count);
        ctx.set_ch((cylinder & 0xFF) as u8);
        ctx.set_cl((sector & 0x3F) | (((cylinder >> 2) & 0xC0) as u8));
        ctx.set_dh(head);
        ctx.set_dl(drive);
        ctx.es = buffer.segment;
        ctx.set_bx(buffer.offset);

        self.execute(INT13_DISK, &mut ctx)
    }

    /// Read the first sector (C/H/S 0/0/1) of `drive` to `segment:0000`
    pub fn exec_read_boot_sector(&mut self, drive: u8, segment: u16) -> ExecStatus {
        self.exec_disk_read(drive, 0, 0, 1, 1, FarPtr::new(segment, 0))
    }

    /// Raise INT 18h so the dispatcher re-enters boot failure recovery
    pub fn exec_boot_failure(&mut self) {
        log::debug!("Raising INT 18h");
        let mut ctx = RealModeContext::new();
        self.execute(INT18_BOOT_FAILURE, &mut ctx);
    }

    /// Far call to `ctx.cs:ctx.ip`
    ///
    /// Returns the register state if the called code ever returns.
    pub fn exec_far_call(&mut self, mut ctx: RealModeContext) -> RealModeContext {
        log::debug!("Far call to {}", ctx.code_pointer());
        self.runtime.call16(&mut ctx);
        self.last_context = Some(ctx);
        ctx
    }

    /// Get last AH (high byte of AX)
    pub fn last_ah(&self) -> Option<u8> {
        self.last_context.as_ref().map(|ctx| ctx.get_ah())
    }
}
