//! BIOS Layer - Real mode register block and interrupt requests

pub mod bios_realmode;
pub mod bios_int_executor;
