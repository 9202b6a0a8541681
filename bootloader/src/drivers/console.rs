//! Serial console output for boot messages and the `log` backend

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

use crate::boot_stage::boot_config::BootConfig;

/// COM1 data port
pub const COM1_PORT: u16 = 0x3F8;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
fn write_byte(byte: u8) {
    use x86_64::instructions::port::Port;

    let mut port: Port<u8> = Port::new(COM1_PORT);
    // SAFETY: COM1 is owned by the firmware console; writing its data
    // register has no memory effects.
    unsafe {
        port.write(byte);
    }
}

#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
fn write_byte(_byte: u8) {}

/// Console text sink on the first serial port
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialConsole;

impl SerialConsole {
    pub const fn new() -> Self {
        Self
    }
}

impl Write for SerialConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                write_byte(b'\r');
            }
            write_byte(byte);
        }
        Ok(())
    }
}

/// `log` backend writing `[LEVEL] message` lines to COM1
pub struct SerialLogger {
    level: Mutex<LevelFilter>,
    console: Mutex<SerialConsole>,
}

impl SerialLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self {
            level: Mutex::new(level),
            console: Mutex::new(SerialConsole::new()),
        }
    }

    pub fn set_level(&self, level: LevelFilter) {
        *self.level.lock() = level;
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= *self.level.lock()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut console = self.console.lock();
        let _ = writeln!(console, "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger::new(LevelFilter::Info);

/// Install the serial logger at `level`
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    LOGGER.set_level(level);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Install the serial logger at the configured level
pub fn init_logger_from(config: &BootConfig) -> Result<(), log::SetLoggerError> {
    init_logger(config.log_level)
}
