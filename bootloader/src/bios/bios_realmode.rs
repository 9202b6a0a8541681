//! Real Mode register block for BIOS interrupts and far calls
//!
//! Mirrors the register image the 16-bit trampolines load before an `INT`
//! or a far `CALL` and store back afterwards. Segment registers, `cs:ip` and
//! FLAGS travel with the general registers so the same block serves disk
//! services, the boot-failure notification and the boot hand-off.

use bitflags::bitflags;
use static_assertions::assert_eq_size;

use crate::firmware::far_pointer::FarPtr;
use crate::utils::boot_traits::RealModeRuntime;

bitflags! {
    /// x86 FLAGS register bits visible to real mode callers
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CpuFlags: u16 {
        const CARRY = 1 << 0;
        const PARITY = 1 << 2;
        const ADJUST = 1 << 4;
        const ZERO = 1 << 6;
        const SIGN = 1 << 7;
        const TRAP = 1 << 8;
        const INTERRUPT = 1 << 9;
        const DIRECTION = 1 << 10;
        const OVERFLOW = 1 << 11;
    }
}

/// Real mode CPU context for INT calls
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealModeContext {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
    pub esi: u32,
    pub edi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub ds: u16,
    pub es: u16,
    pub ss: u16,
    pub cs: u16,
    pub ip: u16,
    pub flags: CpuFlags,
}

// The trampolines index this block by byte offset.
assert_eq_size!(RealModeContext, [u8; 44]);

impl RealModeContext {
    /// Create new empty context
    pub fn new() -> Self {
        Self {
            eax: 0,
            ebx: 0,
            ecx: 0,
            edx: 0,
            esi: 0,
            edi: 0,
            ebp: 0,
            esp: 0,
            ds: 0,
            es: 0,
            ss: 0,
            cs: 0,
            ip: 0,
            flags: CpuFlags::empty(),
        }
    }

    /// Get register value by index (for AH, AL, BH, etc.)
    pub fn get_al(&self) -> u8 {
        (self.eax & 0xFF) as u8
    }

    pub fn get_ah(&self) -> u8 {
        ((self.eax >> 8) & 0xFF) as u8
    }

    pub fn get_ax(&self) -> u16 {
        (self.eax & 0xFFFF) as u16
    }

    pub fn get_bx(&self) -> u16 {
        (self.ebx & 0xFFFF) as u16
    }

    pub fn get_cl(&self) -> u8 {
        (self.ecx & 0xFF) as u8
    }

    pub fn get_ch(&self) -> u8 {
        ((self.ecx >> 8) & 0xFF) as u8
    }

    pub fn get_dl(&self) -> u8 {
        (self.edx & 0xFF) as u8
    }

    pub fn get_dh(&self) -> u8 {
        ((self.edx >> 8) & 0xFF) as u8
    }

    /// Set register value
    pub fn set_al(&mut self, val: u8) {
        self.eax = (self.eax & 0xFFFFFF00) | (val as u32);
    }

    pub fn set_ah(&mut self, val: u8) {
        self.eax = (self.eax & 0xFFFF00FF) | ((val as u32) << 8);
    }

    pub fn set_ax(&mut self, val: u16) {
        self.eax = (self.eax & 0xFFFF0000) | (val as u32);
    }

    pub fn set_bx(&mut self, val: u16) {
        self.ebx = (self.ebx & 0xFFFF0000) | (val as u32);
    }

    pub fn set_cl(&mut self, val: u8) {
        self.ecx = (self.ecx & 0xFFFFFF00) | (val as u32);
    }

    pub fn set_ch(&mut self, val: u8) {
        self.ecx = (self.ecx & 0xFFFF00FF) | ((val as u32) << 8);
    }

    pub fn set_dl(&mut self, val: u8) {
        self.edx = (self.edx & 0xFFFFFF00) | (val as u32);
    }

    pub fn set_dh(&mut self, val: u8) {
        self.edx = (self.edx & 0xFFFF00FF) | ((val as u32) << 8);
    }

    /// Far pointer held in `cs:ip`
    pub fn code_pointer(&self) -> FarPtr {
        FarPtr::new(self.cs, self.ip)
    }

    pub fn set_code_pointer(&mut self, target: FarPtr) {
        self.cs = target.segment;
        self.ip = target.offset;
    }

    /// Check carry flag (indicates error in BIOS calls)
    pub fn is_carry_set(&self) -> bool {
        self.flags.contains(CpuFlags::CARRY)
    }
}

impl Default for RealModeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 16-bit trampoline issuing `INT vector` with the given register image
pub type Call16IntFn = unsafe extern "C" fn(vector: u8, ctx: *mut RealModeContext);

/// 16-bit trampoline performing a far call to `ctx.cs:ctx.ip`
pub type Call16Fn = unsafe extern "C" fn(ctx: *mut RealModeContext);

/// Real mode executor backed by the firmware's mode-switch trampolines
pub struct RealModeExecutor {
    call16_int: Call16IntFn,
    call16: Call16Fn,
}

impl RealModeExecutor {
    /// Create new real mode executor
    ///
    /// # Safety
    ///
    /// Both trampolines must switch to real mode, run the request against
    /// the register image and write the resulting registers back. Memory
    /// below 1 MiB must be identity mapped for `read_far_u16`.
    pub unsafe fn new(call16_int: Call16IntFn, call16: Call16Fn) -> Self {
        Self { call16_int, call16 }
    }
}

impl RealModeRuntime for RealModeExecutor {
    fn call16_int(&mut self, vector: u8, ctx: &mut RealModeContext) {
        log::trace!("Executing BIOS interrupt 0x{:02X}", vector);
        // SAFETY: guaranteed by the contract of `RealModeExecutor::new`.
        unsafe { (self.call16_int)(vector, ctx) }
    }

    fn call16(&mut self, ctx: &mut RealModeContext) {
        log::trace!("Far call to {}", ctx.code_pointer());
        // SAFETY: guaranteed by the contract of `RealModeExecutor::new`.
        unsafe { (self.call16)(ctx) }
    }

    fn read_far_u16(&self, segment: u16, offset: u16) -> u16 {
        let linear = FarPtr::new(segment, offset).linear() as usize;
        // SAFETY: low memory is identity mapped per `RealModeExecutor::new`.
        unsafe { core::ptr::read_unaligned(linear as *const u16) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn failing_int(vector: u8, ctx: *mut RealModeContext) {
        let ctx = unsafe { &mut *ctx };
        ctx.set_ah(vector);
        ctx.flags.insert(CpuFlags::CARRY);
    }

    unsafe extern "C" fn returning_call(ctx: *mut RealModeContext) {
        let ctx = unsafe { &mut *ctx };
        ctx.set_ax(0);
    }

    #[test]
    fn test_realmode_context() {
        let mut ctx = RealModeContext::new();
        assert_eq!(ctx.eax, 0);
        assert_eq!(ctx.get_al(), 0);
        assert!(!ctx.is_carry_set());

        ctx.set_al(0x42);
        assert_eq!(ctx.get_al(), 0x42);
        assert_eq!(ctx.eax & 0xFF, 0x42);
    }

    #[test]
    fn test_realmode_context_registers() {
        let mut ctx = RealModeContext::new();

        ctx.set_ax(0x1234);
        assert_eq!(ctx.get_ax(), 0x1234);

        ctx.set_ah(0x56);
        assert_eq!(ctx.get_ah(), 0x56);
        assert_eq!(ctx.get_al(), 0x34);

        ctx.edx = 0xDEAD_BEEF;
        ctx.set_dl(0x80);
        assert_eq!(ctx.edx, 0xDEAD_BE80);
        ctx.set_dh(0x01);
        assert_eq!(ctx.get_dh(), 0x01);
        assert_eq!(ctx.get_dl(), 0x80);

        ctx.set_ch(0x12);
        ctx.set_cl(0x34);
        assert_eq!(ctx.ecx & 0xFFFF, 0x1234);
    }

    #[test]
    fn test_code_pointer() {
        let mut ctx = RealModeContext::new();
        ctx.set_code_pointer(FarPtr::new(0xC800, 0x0003));
        assert_eq!(ctx.cs, 0xC800);
        assert_eq!(ctx.ip, 0x0003);
        assert_eq!(ctx.code_pointer(), FarPtr::new(0xC800, 0x0003));
    }

    #[test]
    fn test_executor_forwards_to_trampolines() {
        let mut executor = unsafe { RealModeExecutor::new(failing_int, returning_call) };

        let mut ctx = RealModeContext::new();
        executor.call16_int(0x13, &mut ctx);
        assert!(ctx.is_carry_set());
        assert_eq!(ctx.get_ah(), 0x13);

        ctx.set_ax(0xAA55);
        executor.call16(&mut ctx);
        assert_eq!(ctx.get_ax(), 0);
    }
}
