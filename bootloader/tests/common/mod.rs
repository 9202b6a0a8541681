//! Fake real mode machine shared by the boot sequence tests

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use ipl_boot::bios::bios_realmode::{CpuFlags, RealModeContext};
use ipl_boot::{
    BootRecovery, BootServices, CdEmulation, CdromBoot, EbdaRecord, FarPtr, IplTable,
    RealModeRuntime,
};

pub const MEMORY_SIZE: usize = 0x10_0000;

/// 512-byte sector ending in the given signature bytes
pub fn boot_sector(lo: u8, hi: u8) -> Vec<u8> {
    let mut sector = vec![0xF4u8; 512];
    sector[0x1FE] = lo;
    sector[0x1FF] = hi;
    sector
}

/// 1 MiB of real mode memory plus first sectors per BIOS drive
pub struct FakeMachine {
    pub memory: Vec<u8>,
    pub disks: HashMap<u8, Vec<u8>>,
    pub disk_reads: Vec<u8>,
    pub transfers: Vec<RealModeContext>,
    pub int18_count: usize,
    pub far_reads: Cell<usize>,
}

impl FakeMachine {
    pub fn new() -> Self {
        Self {
            memory: vec![0; MEMORY_SIZE],
            disks: HashMap::new(),
            disk_reads: Vec::new(),
            transfers: Vec::new(),
            int18_count: 0,
            far_reads: Cell::new(0),
        }
    }

    pub fn with_disk(mut self, drive: u8, sector: Vec<u8>) -> Self {
        self.disks.insert(drive, sector);
        self
    }

    fn disk_read(&mut self, ctx: &mut RealModeContext) {
        let drive = ctx.get_dl();
        self.disk_reads.push(drive);
        match self.disks.get(&drive) {
            Some(sector) if ctx.get_ah() == 0x02 && ctx.get_cl() == 1 => {
                let dest = FarPtr::new(ctx.es, ctx.get_bx()).linear() as usize;
                self.memory[dest..dest + sector.len()].copy_from_slice(sector);
                ctx.set_ah(0);
                ctx.flags.remove(CpuFlags::CARRY);
            }
            _ => {
                // timeout
                ctx.set_ah(0x80);
                ctx.flags.insert(CpuFlags::CARRY);
            }
        }
    }
}

impl RealModeRuntime for FakeMachine {
    fn call16_int(&mut self, vector: u8, ctx: &mut RealModeContext) {
        match vector {
            0x13 => self.disk_read(ctx),
            0x18 => self.int18_count += 1,
            other => panic!("unexpected INT {:02X}h", other),
        }
    }

    fn call16(&mut self, ctx: &mut RealModeContext) {
        self.transfers.push(*ctx);
    }

    fn read_far_u16(&self, segment: u16, offset: u16) -> u16 {
        self.far_reads.set(self.far_reads.get() + 1);
        let addr = FarPtr::new(segment, offset).linear() as usize;
        u16::from_le_bytes([self.memory[addr], self.memory[addr + 1]])
    }
}

/// El Torito setup stand-in publishing its results to the EBDA
pub struct FakeCdrom {
    pub ebda: &'static EbdaRecord,
    pub status: u16,
    pub emulation: CdEmulation,
    pub calls: usize,
}

impl CdromBoot for FakeCdrom {
    fn cdrom_boot(&mut self) -> u16 {
        self.calls += 1;
        if self.status == 0 {
            self.ebda.set_cdemu(self.emulation);
        }
        self.status
    }
}

/// Everything one boot sequence runs against
pub struct Rig {
    pub machine: FakeMachine,
    pub ebda: &'static EbdaRecord,
    pub cdrom: FakeCdrom,
    pub console: String,
}

impl Rig {
    pub fn new(machine: FakeMachine) -> Self {
        let ebda: &'static EbdaRecord = Box::leak(Box::new(EbdaRecord::new()));
        Self {
            machine,
            ebda,
            cdrom: FakeCdrom {
                ebda,
                status: 0,
                emulation: CdEmulation::default(),
                calls: 0,
            },
            console: String::new(),
        }
    }

    pub fn services(&mut self) -> BootServices<'_> {
        BootServices::new(
            &mut self.machine,
            self.ebda,
            &mut self.cdrom,
            &mut self.console,
        )
    }

    pub fn recovery<'a>(&'a mut self, table: &'a IplTable) -> BootRecovery<'a> {
        BootRecovery::new(table, self.services())
    }
}
