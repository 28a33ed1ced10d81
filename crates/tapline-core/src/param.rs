//! Cross-thread integer parameters.
//!
//! Playback settings such as the reverb amount and the output volume are
//! written by a control thread and read once per block by the audio thread.
//! [`SharedParam`] stores them in an atomic with relaxed ordering: a reader
//! may see a value one block late, which the next block corrects. No locks,
//! no allocations.

use core::sync::atomic::{AtomicI32, Ordering};

/// A thread-safe integer parameter with a clamped range.
///
/// Control thread writes, audio thread reads.
#[derive(Debug)]
pub struct SharedParam {
    value: AtomicI32,
    min: i32,
    max: i32,
    default: i32,
}

impl SharedParam {
    /// Create a new parameter with range and default.
    ///
    /// The default is clamped into `[min, max]`.
    pub fn new(default: i32, min: i32, max: i32) -> Self {
        let default = default.clamp(min, max);
        Self {
            value: AtomicI32::new(default),
            min,
            max,
            default,
        }
    }

    /// Set the parameter value, clamped to the range.
    #[inline]
    pub fn set(&self, v: i32) {
        self.value
            .store(v.clamp(self.min, self.max), Ordering::Relaxed);
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Lower bound.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Value restored by [`reset`](Self::reset).
    pub fn default(&self) -> i32 {
        self.default
    }

    /// Reset to default value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

impl Clone for SharedParam {
    fn clone(&self) -> Self {
        Self {
            value: AtomicI32::new(self.get()),
            min: self.min,
            max: self.max,
            default: self.default,
        }
    }
}
