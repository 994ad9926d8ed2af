//! Browser console logger
//!
//! Verbose output is enabled with `?debug=1` (or `?debug=true`) in the page URL.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("{}", record.args()).into();
        match record.level() {
            Level::Error => web_sys::console::error_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
            Level::Info => web_sys::console::info_1(&message),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&message),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger once. Later calls only re-read the debug flag.
pub fn init() {
    init_debug_from_url();
    // Already set when a second visual registers
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if is_debug() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
}

pub fn is_debug() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

fn init_debug_from_url() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Ok(search) = window.location().search() {
        if search.contains("debug=1") || search.contains("debug=true") {
            DEBUG_MODE.store(true, Ordering::Relaxed);
            web_sys::console::log_1(&"[Visual] Debug mode enabled".into());
        }
    }
}
