//! Process-wide debug tracing switch.
//!
//! When enabled, every driver operation emits a `debug` event (device opened,
//! options parsed, attribute values chosen, bytes transferred). The flag is a
//! single atomic so it can be flipped from any thread without teardown.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Turn verbose operation tracing on or off. Off by default.
pub fn set_debug_enabled(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Emit a `debug` event on the `rawserial` target if tracing is enabled.
macro_rules! driver_debug {
    ($($arg:tt)+) => {
        if $crate::trace::debug_enabled() {
            ::tracing::debug!(target: "rawserial", $($arg)+);
        }
    };
}
pub(crate) use driver_debug;

/// Render bytes as ` 0A 1B ...`.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        let _ = write!(out, " {:02X}", b);
    }
    out
}
