//! Real mode far pointers
//!
//! A far pointer addresses `segment * 16 + offset`. Many pairs name the same
//! byte; the canonical form keeps the segment on a 64 KiB boundary so code
//! entered through it sees a full segment above the entry point.

use core::fmt;

/// Top of the real mode address space (exclusive)
pub const REAL_MODE_LIMIT: u32 = 0x10_0000;

/// Segment:offset address pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FarPtr {
    pub segment: u16,
    pub offset: u16,
}

impl FarPtr {
    pub const fn new(segment: u16, offset: u16) -> Self {
        Self { segment, offset }
    }

    /// Split a 32-bit vector: high word is the segment, low word the offset
    pub const fn from_vector(vector: u32) -> Self {
        Self {
            segment: (vector >> 16) as u16,
            offset: (vector & 0xFFFF) as u16,
        }
    }

    /// Pack back into the 32-bit vector layout
    pub const fn to_vector(self) -> u32 {
        ((self.segment as u32) << 16) | self.offset as u32
    }

    /// Linear address, without A20 wrap-around
    pub const fn linear(self) -> u32 {
        ((self.segment as u32) << 4) + self.offset as u32
    }

    /// Re-express the same byte with the segment masked to `0xF000`
    ///
    /// For a pointer with offset 0 this is `offset = (segment & 0x0FFF) << 4`,
    /// `segment &= 0xF000`. Pointers past the 1 MiB boundary have no
    /// canonical form and are returned unchanged.
    pub const fn canonicalize(self) -> Self {
        let linear = self.linear();
        if linear >= REAL_MODE_LIMIT {
            return self;
        }
        Self {
            segment: ((linear >> 4) & 0xF000) as u16,
            offset: (linear & 0xFFFF) as u16,
        }
    }

    pub const fn is_canonical(self) -> bool {
        self.segment & 0x0FFF == 0
    }
}

impl fmt::Display for FarPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.segment, self.offset)
    }
}
