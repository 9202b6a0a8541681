//! Initial Program Load (IPL) table
//!
//! The table is filled once while the firmware initialises, installed, and
//! from then on only read. Boot priorities are packed into a 32-bit word,
//! one nibble per priority with priority 0 in the least significant nibble.
//! A nibble holds a 1-based table index; 0 means nothing is configured at
//! that priority.

use core::fmt;

use arrayvec::ArrayVec;
use spin::Once;

use crate::boot_stage::boot_config::{BootConfig, CONFIG_CDROM_BOOT};

/// Fixed capacity of the IPL table
pub const IPL_TABLE_ENTRIES: usize = 8;

/// Number of priority nibbles in a boot order word
pub const BOOT_ORDER_SLOTS: u16 = 8;

/// Significant bytes of a BEV product string
pub const DESCRIPTION_LEN: usize = 32;

pub const IPL_TYPE_FLOPPY: u16 = 0x01;
pub const IPL_TYPE_HARDDISK: u16 = 0x02;
pub const IPL_TYPE_CDROM: u16 = 0x03;
pub const IPL_TYPE_BEV: u16 = 0x80;

/// Device class of an IPL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IplType {
    Floppy,
    HardDisk,
    CdRom,
    /// Expansion ROM Bootstrap Entry Vector
    Bev,
}

impl IplType {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            IPL_TYPE_FLOPPY => Some(Self::Floppy),
            IPL_TYPE_HARDDISK => Some(Self::HardDisk),
            IPL_TYPE_CDROM => Some(Self::CdRom),
            IPL_TYPE_BEV => Some(Self::Bev),
            _ => None,
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::Floppy => IPL_TYPE_FLOPPY,
            Self::HardDisk => IPL_TYPE_HARDDISK,
            Self::CdRom => IPL_TYPE_CDROM,
            Self::Bev => IPL_TYPE_BEV,
        }
    }
}

/// One configured boot target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IplEntry {
    /// Raw device class; see [`IplType::from_raw`]
    pub kind: u16,
    /// Owned by the disk layer, carried through untouched
    pub flags: u16,
    /// BEV entry point, segment in the high word
    pub vector: u32,
    /// Product string of an expansion ROM
    pub description: Option<&'static [u8]>,
}

impl IplEntry {
    pub const fn new(kind: u16) -> Self {
        Self {
            kind,
            flags: 0,
            vector: 0,
            description: None,
        }
    }

    pub const fn floppy() -> Self {
        Self::new(IPL_TYPE_FLOPPY)
    }

    pub const fn hard_disk() -> Self {
        Self::new(IPL_TYPE_HARDDISK)
    }

    pub const fn cdrom() -> Self {
        Self::new(IPL_TYPE_CDROM)
    }

    pub const fn bev(vector: u32, description: Option<&'static [u8]>) -> Self {
        Self {
            kind: IPL_TYPE_BEV,
            flags: 0,
            vector,
            description,
        }
    }

    pub fn ipl_type(&self) -> Option<IplType> {
        IplType::from_raw(self.kind)
    }
}

/// Packed boot priorities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootOrder(u32);

impl BootOrder {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Build from 1-based table indices, highest priority first
    pub fn from_slots(slots: &[u8]) -> Self {
        let raw = slots
            .iter()
            .take(BOOT_ORDER_SLOTS as usize)
            .enumerate()
            .fold(0u32, |acc, (priority, &slot)| {
                acc | (((slot & 0xF) as u32) << (4 * priority))
            });
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Nibble at `priority`; 0 past the last slot
    pub fn slot(self, priority: u16) -> u8 {
        if priority >= BOOT_ORDER_SLOTS {
            return 0;
        }
        ((self.0 >> (4 * priority as u32)) & 0xF) as u8
    }
}

/// Why a priority did not resolve to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// Priority 0 is empty: nothing is configured at all
    NoBootableDevice,
    /// Priority past the last nibble of the boot order
    Exhausted(u16),
    /// Nothing configured at this (non-zero) priority
    EmptySlot(u16),
    /// Nibble points past the end of the table (0-based index)
    InvalidSlot(usize),
}

impl LookupError {
    /// Fatal lookups end the boot sequence; the others skip one priority
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoBootableDevice | Self::Exhausted(_))
    }
}

/// Returned when the table has no room left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFull;

impl fmt::Display for TableFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPL table full ({} entries)", IPL_TABLE_ENTRIES)
    }
}

/// Boot device catalogue and priority order
#[derive(Debug, Clone)]
pub struct IplTable {
    entries: ArrayVec<IplEntry, IPL_TABLE_ENTRIES>,
    bootorder: BootOrder,
    checkfloppysig: bool,
}

impl IplTable {
    pub fn new(bootorder: BootOrder, checkfloppysig: bool) -> Self {
        Self {
            entries: ArrayVec::new(),
            bootorder,
            checkfloppysig,
        }
    }

    pub fn from_config(config: &BootConfig) -> Self {
        Self::new(config.boot_order, config.check_floppy_sig)
    }

    /// Table seeded with the built-in floppy, hard disk and CD-ROM entries
    pub fn with_defaults(config: &BootConfig) -> Self {
        let mut table = Self::from_config(config);
        table.entries.push(IplEntry::floppy());
        table.entries.push(IplEntry::hard_disk());
        if CONFIG_CDROM_BOOT {
            table.entries.push(IplEntry::cdrom());
        }
        table
    }

    /// Append an entry, returning its 0-based index
    pub fn add(&mut self, entry: IplEntry) -> Result<usize, TableFull> {
        match self.entries.try_push(entry) {
            Ok(()) => Ok(self.entries.len() - 1),
            Err(_) => {
                log::warn!("IPL table full, dropping entry of type {:#x}", entry.kind);
                Err(TableFull)
            }
        }
    }

    /// Register an expansion ROM Bootstrap Entry Vector
    pub fn add_bev(
        &mut self,
        vector: u32,
        description: Option<&'static [u8]>,
    ) -> Result<usize, TableFull> {
        log::debug!("Registering BEV at {:#010x}", vector);
        self.add(IplEntry::bev(vector, description))
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, index: usize) -> Option<&IplEntry> {
        self.entries.get(index)
    }

    pub fn boot_order(&self) -> BootOrder {
        self.bootorder
    }

    pub fn check_floppy_sig(&self) -> bool {
        self.checkfloppysig
    }

    /// Resolve the entry configured at `priority`
    pub fn entry_at(&self, priority: u16) -> Result<&IplEntry, LookupError> {
        if priority >= BOOT_ORDER_SLOTS {
            return Err(LookupError::Exhausted(priority));
        }

        let slot = self.bootorder.slot(priority);
        if slot == 0 {
            return Err(if priority == 0 {
                LookupError::NoBootableDevice
            } else {
                LookupError::EmptySlot(priority)
            });
        }

        let index = (slot - 1) as usize;
        self.entries
            .get(index)
            .ok_or(LookupError::InvalidSlot(index))
    }
}

static IPL: Once<IplTable> = Once::new();

/// Publish the table for the rest of the firmware's lifetime
pub fn install_ipl_table(table: IplTable) -> &'static IplTable {
    if IPL.is_completed() {
        log::warn!("IPL table already installed, keeping the first one");
    }
    IPL.call_once(|| table)
}

pub fn ipl_table() -> Option<&'static IplTable> {
    IPL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table_of(count: usize, order: BootOrder) -> IplTable {
        let mut table = IplTable::new(order, true);
        for i in 0..count {
            table.add(IplEntry::bev(0xC800_0000 | i as u32, None)).unwrap();
        }
        table
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(IplType::from_raw(1), Some(IplType::Floppy));
        assert_eq!(IplType::from_raw(2), Some(IplType::HardDisk));
        assert_eq!(IplType::from_raw(3), Some(IplType::CdRom));
        assert_eq!(IplType::from_raw(0x80), Some(IplType::Bev));
        assert_eq!(IplType::from_raw(0), None);
        assert_eq!(IplType::from_raw(4), None);
        assert_eq!(IplType::Bev.raw(), 0x80);
    }

    #[test]
    fn test_boot_order_slots() {
        let order = BootOrder::from_slots(&[2, 1, 3]);
        assert_eq!(order.raw(), 0x312);
        assert_eq!(order.slot(0), 2);
        assert_eq!(order.slot(1), 1);
        assert_eq!(order.slot(2), 3);
        assert_eq!(order.slot(7), 0);
        assert_eq!(order.slot(8), 0);
        assert_eq!(BootOrder::new(0xF000_0000).slot(7), 0xF);
    }

    #[test]
    fn test_empty_first_priority_is_fatal() {
        let table = table_of(2, BootOrder::new(0x10));
        assert_eq!(table.entry_at(0), Err(LookupError::NoBootableDevice));
        assert!(LookupError::NoBootableDevice.is_fatal());
    }

    #[test]
    fn test_empty_later_priority_is_skipped() {
        let table = table_of(2, BootOrder::new(0x201));
        assert!(table.entry_at(0).is_ok());
        assert_eq!(table.entry_at(1), Err(LookupError::EmptySlot(1)));
        assert!(!LookupError::EmptySlot(1).is_fatal());
        assert_eq!(table.entry_at(2).unwrap().vector, 0xC800_0001);
    }

    #[test]
    fn test_out_of_range_index() {
        let table = table_of(2, BootOrder::new(0x3));
        assert_eq!(table.entry_at(0), Err(LookupError::InvalidSlot(2)));
        assert!(!LookupError::InvalidSlot(2).is_fatal());
    }

    #[test]
    fn test_priority_past_last_slot() {
        let table = table_of(1, BootOrder::new(0x1111_1111));
        assert!(table.entry_at(7).is_ok());
        assert_eq!(table.entry_at(8), Err(LookupError::Exhausted(8)));
        assert!(LookupError::Exhausted(8).is_fatal());
    }

    #[test]
    fn test_capacity() {
        let mut table = table_of(IPL_TABLE_ENTRIES, BootOrder::new(1));
        assert_eq!(table.count(), IPL_TABLE_ENTRIES);
        assert_eq!(table.add_bev(0xD000_0000, None), Err(TableFull));
        assert_eq!(table.count(), IPL_TABLE_ENTRIES);
    }

    #[test]
    fn test_defaults() {
        let config = BootConfig::from_cmos(0x30, 0x21);
        let mut table = IplTable::with_defaults(&config);
        assert_eq!(table.entry(0), Some(&IplEntry::floppy()));
        assert_eq!(table.entry(1), Some(&IplEntry::hard_disk()));
        assert!(table.check_floppy_sig());
        assert_eq!(table.boot_order().raw(), 0x321);

        let index = table.add_bev(0xC800_0003, Some(&b"iPXE"[..])).unwrap();
        assert_eq!(table.entry(index).unwrap().ipl_type(), Some(IplType::Bev));
        if CONFIG_CDROM_BOOT {
            assert_eq!(index, 3);
            assert_eq!(table.entry(2), Some(&IplEntry::cdrom()));
        } else {
            assert_eq!(index, 2);
        }
    }

    #[test]
    fn test_install_is_first_wins() {
        let first = install_ipl_table(table_of(1, BootOrder::new(1)));
        let second = install_ipl_table(table_of(3, BootOrder::new(1)));
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 1);
        assert_eq!(ipl_table().map(IplTable::count), Some(1));
    }

    proptest! {
        #[test]
        fn nibble_resolves_to_index_minus_one(
            count in 1usize..=IPL_TABLE_ENTRIES,
            nibble in 1u8..=15,
            priority in 0u16..BOOT_ORDER_SLOTS,
        ) {
            let order = BootOrder::new((nibble as u32) << (4 * priority as u32));
            let table = table_of(count, order);
            let resolved = table.entry_at(priority);
            if (nibble as usize) <= count {
                let entry = resolved.unwrap();
                prop_assert_eq!(entry.vector, 0xC800_0000 | (nibble as u32 - 1));
            } else {
                prop_assert_eq!(resolved, Err(LookupError::InvalidSlot(nibble as usize - 1)));
            }
        }

        #[test]
        fn zero_nibble_is_fatal_only_at_priority_zero(priority in 0u16..BOOT_ORDER_SLOTS) {
            let table = table_of(1, BootOrder::new(0));
            let resolved = table.entry_at(priority);
            if priority == 0 {
                prop_assert_eq!(resolved, Err(LookupError::NoBootableDevice));
            } else {
                prop_assert_eq!(resolved, Err(LookupError::EmptySlot(priority)));
            }
        }
    }
}
