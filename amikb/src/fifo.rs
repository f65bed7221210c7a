//! Outgoing scancode queue.

use heapless::spsc::Queue;

/// Default queue size. One slot stays reserved to tell full from empty,
/// so 19 encoded scancodes fit.
pub const FIFO_CAPACITY: usize = 20;

/// Encode a scancode and its direction into the wire byte.
/// Bit 0 carries the direction: 0 = pressed, 1 = released.
pub const fn encode(scancode: u8, pressed: bool) -> u8 {
    (scancode << 1) | if pressed { 0 } else { 1 }
}

/// Split a wire byte back into scancode and direction.
pub const fn decode(encoded: u8) -> (u8, bool) {
    (encoded >> 1, encoded & 1 == 0)
}

/// The queue has no free slot; the event must be retried later.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoFull;

/// Fixed-capacity FIFO of encoded scancodes, single producer and single
/// consumer.
///
/// `peek` leaves the oldest byte in place so an unacknowledged
/// transmission can be retried without losing it; `pop` commits it only
/// once the host has acknowledged.
pub struct ScancodeFifo<const N: usize = FIFO_CAPACITY> {
    queue: Queue<u8, N>,
}

impl<const N: usize> ScancodeFifo<N> {
    pub const fn new() -> Self {
        Self { queue: Queue::new() }
    }

    /// Encode and append one key event.
    pub fn push(&mut self, scancode: u8, pressed: bool) -> Result<(), FifoFull> {
        self.queue.enqueue(encode(scancode, pressed)).map_err(|_| FifoFull)
    }

    /// The oldest byte, without removing it.
    pub fn peek(&self) -> Option<u8> {
        self.queue.peek().copied()
    }

    /// Remove and return the oldest byte.
    pub fn pop(&mut self) -> Option<u8> {
        self.queue.dequeue()
    }

    /// Discard all queued bytes.
    pub fn flush(&mut self) {
        while self.queue.dequeue().is_some() {}
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Usable capacity (N - 1).
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<const N: usize> Default for ScancodeFifo<N> {
    fn default() -> Self {
        Self::new()
    }
}
