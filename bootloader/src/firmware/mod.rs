//! Firmware data - far pointers, boot sectors and the EBDA record

pub mod far_pointer;
pub mod mbr_handler;
pub mod ebda;
