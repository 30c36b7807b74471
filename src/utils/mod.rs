mod display;
pub use display::*;
mod parse;
pub use parse::*;

use std::env;
use std::fs;

/// Best-effort lookup of this machine's hostname
pub fn system_hostname() -> Option<String> {
    let candidates = ["/proc/sys/kernel/hostname", "/etc/hostname"];
    candidates
        .iter()
        .filter_map(|path| fs::read_to_string(path).ok())
        .chain(env::var("HOSTNAME").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}
