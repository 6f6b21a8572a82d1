//! Job progress on a 0..=100 scale.
//!
//! The scale is split into bands: setup (masks) below 5, image preloading
//! 5..=85, page composition 85..=100. Updates go through an atomic
//! `fetch_max`, so the reported value never moves backwards even when
//! several batch completions race.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Where the preload band starts.
pub const PRELOAD_START: u8 = 5;
/// Width of the preload band.
pub const PRELOAD_SPAN: u8 = 80;
/// Where the composition band starts.
pub const COMPOSE_START: u8 = PRELOAD_START + PRELOAD_SPAN;
/// Completion.
pub const DONE: u8 = 100;

type Observer = dyn Fn(u8) + Send + Sync;

/// Shared, monotone progress counter.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    value: Arc<AtomicU8>,
    observer: Option<Arc<Observer>>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("value", &self.get())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that calls `observer` each time the value increases.
    pub fn with_observer(observer: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self {
            value: Arc::new(AtomicU8::new(0)),
            observer: Some(Arc::new(observer)),
        }
    }

    /// Current value.
    pub fn get(&self) -> u8 {
        self.value.load(Ordering::SeqCst)
    }

    /// Raise the value to `percent` (clamped to 100). Lower values are ignored.
    pub fn advance(&self, percent: u8) {
        let percent = percent.min(DONE);
        let previous = self.value.fetch_max(percent, Ordering::SeqCst);
        if percent > previous {
            if let Some(observer) = &self.observer {
                observer(percent);
            }
        }
    }

    /// Reset to zero before a new job or after a failed one.
    ///
    /// The observer only hears about it when the value actually drops.
    pub fn reset(&self) {
        let previous = self.value.swap(0, Ordering::SeqCst);
        if previous > 0 {
            if let Some(observer) = &self.observer {
                observer(0);
            }
        }
    }
}

/// Progress value after `completed` of `total` images are preloaded.
pub fn preload_progress(completed: usize, total: usize) -> u8 {
    band_progress(PRELOAD_START, PRELOAD_SPAN, completed, total)
}

/// Progress value after `completed` of `total` pages are composed.
pub fn compose_progress(completed: usize, total: usize) -> u8 {
    band_progress(COMPOSE_START, DONE - COMPOSE_START, completed, total)
}

fn band_progress(start: u8, span: u8, completed: usize, total: usize) -> u8 {
    if total == 0 {
        return start + span;
    }
    let fraction = completed.min(total) as f64 / total as f64;
    start + (fraction * f64::from(span)).round() as u8
}
