//! Terminal rendering for translation passes.
//!
//! Rendering goes to stderr so stdout stays clean for piped text
//! (e.g. `voxlate --no-playback | tee log.txt`).

use std::io::{self, IsTerminal};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

fn colors_enabled() -> bool {
    io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Clear the current terminal line.
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Render one completed pass: what was heard and what it became.
pub fn render_pass(original: &str, translated: &str) {
    if colors_enabled() {
        eprintln!("{DIM}You said:{RESET} {CYAN}{original}{RESET}");
        eprintln!("{DIM}Translation:{RESET} {GREEN}{translated}{RESET}");
    } else {
        eprintln!("You said: {original}");
        eprintln!("Translation: {translated}");
    }
}

/// Render a transient status line, e.g. "Listening...".
pub fn render_status(message: &str) {
    if colors_enabled() {
        eprintln!("{DIM}{message}{RESET}");
    } else {
        eprintln!("{message}");
    }
}
