use std::sync::OnceLock;

use console::style;

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::debug::write_debug_logs(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::debug::write_warn_logs(format!($($arg)*))
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    Debug,
    #[default]
    Warn,
}

static LEVEL: OnceLock<Level> = OnceLock::new();

/// Set the process log level. Only the first call takes effect.
pub fn set_level(level: Level) {
    let _ = LEVEL.set(level);
}

fn get_level() -> Level {
    LEVEL.get().copied().unwrap_or_default()
}

pub fn write_debug_logs(msg: String) {
    if !matches!(get_level(), Level::Debug) {
        return;
    }
    eprintln!("{} {msg}", style("DEBUG").dim().for_stderr());
}

pub fn write_warn_logs(msg: String) {
    let styled = style(format!("WARN {msg}")).yellow().bold().for_stderr();
    eprintln!("{styled}");
}
