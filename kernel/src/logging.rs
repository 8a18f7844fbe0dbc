//! Kernel logging
//!
//! Implements [`log::Log`] over the first 16550 UART so every subsystem can use
//! the `log` macros. Records are written with interrupts masked, which keeps
//! an interrupt handler that logs from spinning on a lock its own CPU holds.

use core::fmt::{self, Write};

use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;
use uart_16550::SerialPort;

use crate::interrupts::without_interrupts;

/// I/O base of COM1.
const COM1: u16 = 0x3F8;

lazy_static! {
    static ref SERIAL1: Mutex<SerialPort> = {
        let mut port = unsafe { SerialPort::new(COM1) };
        port.init();
        Mutex::new(port)
    };
}

/// `Log` implementation for serial
pub struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl KernelLogger {
    #[cfg(debug_assertions)]
    const LEVEL: Level = Level::Trace;
    #[cfg(debug_assertions)]
    const LEVEL_FILTER: LevelFilter = LevelFilter::Trace;

    #[cfg(not(debug_assertions))]
    const LEVEL: Level = Level::Info;
    #[cfg(not(debug_assertions))]
    const LEVEL_FILTER: LevelFilter = LevelFilter::Info;
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Self::LEVEL
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        without_interrupts(|| {
            let _ = write_record(&mut *SERIAL1.lock(), record);
        });
    }

    fn flush(&self) {}
}

/// Formats one record as a single `[LEVEL target] message` line.
fn write_record<W: Write>(out: &mut W, record: &Record) -> fmt::Result {
    writeln!(
        out,
        "[{:<5} {}] {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Installs the serial logger.
///
/// # Arguments
/// * `cpu_id` - ID of the CPU performing initialization. Only CPU 0
///   installs the logger.
pub fn init(cpu_id: u32) -> Result<(), SetLoggerError> {
    if cpu_id == 0 {
        log::set_logger(&LOGGER)?;
        log::set_max_level(KernelLogger::LEVEL_FILTER);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_one_line_with_level_and_target() {
        let mut out = String::new();
        write_record(
            &mut out,
            &Record::builder()
                .level(Level::Warn)
                .target("kestrel::interrupts::registry")
                .args(format_args!("dropping unhandled IRQ {}", 7))
                .build(),
        )
        .unwrap();
        assert_eq!(
            out,
            "[WARN  kestrel::interrupts::registry] dropping unhandled IRQ 7\n"
        );
    }

    #[test]
    fn secondary_cpus_leave_the_logger_alone() {
        assert!(init(1).is_ok());
    }

    #[test]
    fn level_follows_build_profile() {
        let logger = KernelLogger;
        let info = Metadata::builder().level(Level::Info).build();
        assert!(logger.enabled(&info));
        let trace = Metadata::builder().level(Level::Trace).build();
        assert_eq!(logger.enabled(&trace), cfg!(debug_assertions));
    }
}
