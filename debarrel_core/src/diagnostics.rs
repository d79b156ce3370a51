use once_cell::sync::Lazy;

static DEBUG_ENABLED: Lazy<bool> = Lazy::new(|| {
    std::env::var("DEBARREL_DEBUG")
        .ok()
        .is_some_and(|value| !value.trim().is_empty() && value.trim() != "0")
});

pub fn debug_enabled() -> bool {
    *DEBUG_ENABLED
}

/// Prints a degraded-path note to stderr when `DEBARREL_DEBUG` is set.
/// The message is only built when the note will actually be printed.
pub fn debug(message: impl FnOnce() -> String) {
    if debug_enabled() {
        eprintln!("debarrel: {}", message());
    }
}
