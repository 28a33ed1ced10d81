//! Integer feedback-comb slot buffer.
//!
//! A [`TapLine`] is one tap of a multi-tap echo: a zeroed ring of `i32`
//! slots addressed by an external, shared cursor. Each tap wraps the cursor
//! by its own length, so taps of different lengths driven by one cursor give
//! different delays without any per-tap write position.
//!
//! The recurrence is the classic integer feedback comb:
//!
//! ```text
//! slot = input + ((pct * slot) >> 7)
//! ```
//!
//! where `pct / 128` is the decay per trip around the ring. The shift is
//! arithmetic and truncating, and all arithmetic wraps on overflow rather
//! than panicking.
//!
//! Allocation is fallible: [`TapLine::try_new`] reports out-of-memory
//! instead of aborting, so callers on an audio path can degrade to bypass.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use core::fmt;

/// Failure to build a [`TapLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapLineError {
    /// A tap must hold at least one slot.
    ZeroLength,
    /// The slot buffer could not be reserved.
    OutOfMemory {
        /// Number of slots requested.
        slots: usize,
    },
}

impl fmt::Display for TapLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapLineError::ZeroLength => write!(f, "tap length must be nonzero"),
            TapLineError::OutOfMemory { slots } => {
                write!(f, "failed to allocate {} tap slots", slots)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TapLineError {}

/// One fixed-length tap of a multi-tap feedback echo.
///
/// The backing buffer holds `length + 1` zeroed slots; only the first
/// `length` are ever addressed, since positions are `cursor % length`.
#[derive(Debug, Clone)]
pub struct TapLine {
    length: usize,
    slots: Vec<i32>,
}

impl TapLine {
    /// Allocate a zeroed tap of `length` slots.
    pub fn try_new(length: usize) -> Result<Self, TapLineError> {
        if length == 0 {
            return Err(TapLineError::ZeroLength);
        }
        let capacity = length.saturating_add(1);
        let mut slots = Vec::new();
        if slots.try_reserve_exact(capacity).is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!(slots = capacity, "tap line allocation failed");
            return Err(TapLineError::OutOfMemory { slots: capacity });
        }
        slots.resize(capacity, 0);
        Ok(Self { length, slots })
    }

    /// Ring length (the modulus applied to the cursor).
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false: a tap holds at least one slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Slot addressed by `cursor`.
    #[inline]
    pub fn position(&self, cursor: u32) -> usize {
        (cursor as usize) % self.length
    }

    /// Value currently held in slot `pos`.
    #[inline]
    pub fn read(&self, pos: usize) -> i32 {
        self.slots[pos]
    }

    /// Feed `input` into slot `pos`, decaying the slot's old value by `pct / 128`.
    #[inline]
    pub fn feed(&mut self, pos: usize, input: i32, pct: i32) {
        let slot = &mut self.slots[pos];
        *slot = input.wrapping_add(pct.wrapping_mul(*slot) >> 7);
    }

    /// Whether every slot is zero.
    pub fn is_silent(&self) -> bool {
        self.slots.iter().all(|&s| s == 0)
    }
}
