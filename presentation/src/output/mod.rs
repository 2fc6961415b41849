//! Output formatting for the console

pub mod console;

pub use console::ConsoleFormatter;

/// Turn colored output on or off for the whole process.
pub fn set_color_enabled(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}
