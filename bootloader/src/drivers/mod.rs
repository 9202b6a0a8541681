//! Device drivers

pub mod console;

pub use console::{SerialConsole, init_logger, init_logger_from};
