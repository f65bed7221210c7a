//! Edge events shared between the scanner and the dispatcher.

use core::sync::atomic::{AtomicU8, Ordering};

/// Per-column press/release edge bitfields.
///
/// The scanner ORs new edges in from its sampling context; the dispatcher
/// clears exactly the bit it consumed with an AND-NOT. Both sides are
/// single-bit read-modify-writes, so any interleaving preserves every
/// event; at worst an edge is observed one dispatch pass late.
pub struct PendingEvents<const COLS: usize> {
    pressed: [AtomicU8; COLS],
    released: [AtomicU8; COLS],
}

impl<const COLS: usize> PendingEvents<COLS> {
    pub const fn new() -> Self {
        Self {
            pressed: [const { AtomicU8::new(0) }; COLS],
            released: [const { AtomicU8::new(0) }; COLS],
        }
    }

    /// Accumulate new edges for a column. Bits stay set until acknowledged.
    pub fn raise(&self, col: usize, pressed: u8, released: u8) {
        if pressed != 0 {
            self.pressed[col].fetch_or(pressed, Ordering::Relaxed);
        }
        if released != 0 {
            self.released[col].fetch_or(released, Ordering::Relaxed);
        }
    }

    pub fn pressed(&self, col: usize) -> u8 {
        self.pressed[col].load(Ordering::Relaxed)
    }

    pub fn released(&self, col: usize) -> u8 {
        self.released[col].load(Ordering::Relaxed)
    }

    /// Consume press edges; only the given bits are cleared.
    pub fn ack_pressed(&self, col: usize, mask: u8) {
        self.pressed[col].fetch_and(!mask, Ordering::Relaxed);
    }

    /// Consume release edges; only the given bits are cleared.
    pub fn ack_released(&self, col: usize, mask: u8) {
        self.released[col].fetch_and(!mask, Ordering::Relaxed);
    }

    /// Drop every pending edge.
    pub fn clear(&self) {
        for col in 0..COLS {
            self.pressed[col].store(0, Ordering::Relaxed);
            self.released[col].store(0, Ordering::Relaxed);
        }
    }
}

impl<const COLS: usize> Default for PendingEvents<COLS> {
    fn default() -> Self {
        Self::new()
    }
}
