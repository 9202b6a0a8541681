//! BIOS initial program load
//!
//! Chooses the boot device from the IPL table, loads its boot code into
//! real mode memory and transfers control to it. Failed attempts chain
//! through INT 18h to the next configured priority.
//!
//! The crate is organised into subsystems:
//! - `bios` - real mode register block and interrupt requests
//! - `firmware` - far pointers, boot sector checks, EBDA state
//! - `boot_stage` - IPL table, device dispatch, retry controller, reporting
//! - `drivers` - serial console and log backend
//! - `utils` - collaborator traits

#![cfg_attr(not(test), no_std)]

pub mod error;

/// BIOS layer - real mode register marshalling and INT requests
pub mod bios;

/// Firmware data - far pointers, boot sectors, EBDA
pub mod firmware;

/// Boot orchestration - table, dispatch, recovery, reporting
pub mod boot_stage;

/// Device drivers - serial console
pub mod drivers;

/// Collaborator traits for dependency injection
pub mod utils;

pub use boot_stage::boot_config::BootConfig;
pub use boot_stage::boot_dispatch::{
    AttemptFailure, BootDispatcher, BootOutcome, JumpTarget, SkipReason,
};
pub use boot_stage::boot_recovery::{BootRecovery, handle_18, handle_19, next_boot_sequence};
pub use boot_stage::boot_table::{
    BootOrder, IplEntry, IplTable, IplType, LookupError, install_ipl_table, ipl_table,
};
pub use error::{BootError, Result};
pub use firmware::ebda::EbdaRecord;
pub use firmware::far_pointer::FarPtr;
pub use utils::boot_traits::{
    BiosDataArea, BootServices, CdEmulation, CdromBoot, RealModeRuntime,
};
