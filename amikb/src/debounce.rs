//! Sample-window debouncing for the matrix scanner.

/// Per-column history of the last `DEPTH` raw readings.
///
/// Each reading is a row bitfield where 0 means contact closed (pressed)
/// and 1 means open. The filter combines the window with a bitwise OR: a
/// key reads pressed only when every stored sample agrees, while a single
/// open sample anywhere in the window makes it read released.
pub struct Debouncer<const COLS: usize, const DEPTH: usize> {
    samples: [[u8; DEPTH]; COLS],
}

impl<const COLS: usize, const DEPTH: usize> Debouncer<COLS, DEPTH> {
    pub const fn new() -> Self {
        Self {
            samples: [[0xFF; DEPTH]; COLS],
        }
    }

    /// Store `raw` into the column's given history slot and return the
    /// combined reading for the whole window.
    pub fn record(&mut self, col: usize, slot: usize, raw: u8) -> u8 {
        self.samples[col][slot] = raw;
        self.samples[col].iter().copied().fold(0, |acc, s| acc | s)
    }

    /// Forget all history; every key reads released.
    pub fn reset(&mut self) {
        self.samples = [[0xFF; DEPTH]; COLS];
    }
}

impl<const COLS: usize, const DEPTH: usize> Default for Debouncer<COLS, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}
