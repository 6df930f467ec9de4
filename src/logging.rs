//! Console logging and panic reporting, installed once per page.

use std::sync::Once;

use log::LevelFilter;

static INIT: Once = Once::new();

/// Install the console logger and panic hook on first use, then apply `level`.
pub fn init(level: LevelFilter) {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Trace).is_err() {
            log::warn!("a logger is already installed; card logs go through it");
        }
    });
    log::set_max_level(level);
}
