use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

static PROFILE_ENABLED: Lazy<bool> = Lazy::new(|| {
    matches!(
        std::env::var("DEBARREL_PROFILE").ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
    )
});

pub fn enabled() -> bool {
    *PROFILE_ENABLED
}

/// Prints how long a phase took when dropped.
pub struct ProfileSpan {
    name: &'static str,
    start: Instant,
}

impl ProfileSpan {
    pub fn new(name: &'static str) -> Option<Self> {
        enabled().then_some(Self {
            name,
            start: Instant::now(),
        })
    }
}

impl Drop for ProfileSpan {
    fn drop(&mut self) {
        let pretty_elapsed = format_elapsed(self.start.elapsed());
        eprintln!(
            "[debarrel-profile] {name} took {pretty_elapsed}",
            name = self.name
        );
    }
}

pub fn span(name: &'static str) -> Option<ProfileSpan> {
    ProfileSpan::new(name)
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    match micros {
        0..1_000 => format!("{micros}µs"),
        1_000..1_000_000 => format!("{:.1}ms", micros as f64 / 1_000.0),
        _ => format!("{:.2}s", elapsed.as_secs_f64()),
    }
}
