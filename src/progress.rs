use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

// No #[macro_export]; this macro is made visible crate-wide by
// `#[macro_use] mod progress;` in main.rs.
macro_rules! vprintln {
    ($($arg:tt)*) => {{
        if crate::progress::verbose() {
            eprintln!($($arg)*);
        }
    }}
}

/// Shared fetch-stage counters. Passed into the concurrent fetch tasks by
/// Arc; the report stage prints the totals once at the end of the run.
#[derive(Debug, Default)]
pub struct Progress {
    months_done: AtomicUsize,
    months_failed: AtomicUsize,
    games: AtomicUsize,
}

impl Progress {
    pub fn month_done(&self, games: usize) {
        self.months_done.fetch_add(1, Ordering::Relaxed);
        self.games.fetch_add(games, Ordering::Relaxed);
    }

    pub fn month_failed(&self) {
        self.months_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> String {
        let done = self.months_done.load(Ordering::Relaxed);
        let failed = self.months_failed.load(Ordering::Relaxed);
        let games = self.games.load(Ordering::Relaxed);
        if failed == 0 {
            format!("{} months fetched, {} games", done, games)
        } else {
            format!("{} months fetched ({} failed), {} games", done, failed, games)
        }
    }
}
