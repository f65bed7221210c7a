//! Matrix scanning: one column per tick, edge detection, reserved reset
//! combination.

use embassy_time::{Duration, Ticker};
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{KeyPos, KeyboardConfig};
use crate::debounce::Debouncer;
use crate::event::PendingEvents;
use crate::state;

/// Scans the switch matrix one column at a time.
///
/// Columns are driven active-low one at a time; rows are inputs pulled
/// high, so a closed contact reads low. A full matrix refresh takes
/// `COLS * DEPTH` sampling periods. Edges land in the shared
/// [`PendingEvents`]; the dispatcher drains them from the main loop.
pub struct Matrix<'a, In, Out, const ROWS: usize, const COLS: usize, const DEPTH: usize = 2> {
    /// Row inputs of the matrix.
    row_pins: [In; ROWS],
    /// Column drive outputs of the matrix.
    col_pins: [Out; COLS],
    debouncer: Debouncer<COLS, DEPTH>,
    /// Debounced key state, one bitfield per column, bit 0 = pressed.
    state: [u8; COLS],
    events: &'a PendingEvents<COLS>,
    reset_combo: [KeyPos; 3],
    sample_period: Duration,
    /// Currently selected column.
    col: usize,
    /// Sample-history slot written during the current pass.
    slot: usize,
    /// Ticks until the debounce window is fully refreshed again.
    warmup: u16,
    reset_armed: bool,
}

impl<'a, In, Out, const ROWS: usize, const COLS: usize, const DEPTH: usize>
    Matrix<'a, In, Out, ROWS, COLS, DEPTH>
where
    In: InputPin,
    Out: OutputPin,
{
    /// Create a matrix scanner from row and column pins.
    pub fn new(
        row_pins: [In; ROWS],
        mut col_pins: [Out; COLS],
        events: &'a PendingEvents<COLS>,
        config: &KeyboardConfig<ROWS, COLS>,
    ) -> Self {
        const { assert!(ROWS <= 8, "row state must fit a single byte") };

        // idle all drive lines, then select the first column
        for pin in col_pins.iter_mut() {
            pin.set_high().ok();
        }
        if let Some(first) = col_pins.first_mut() {
            first.set_low().ok();
        }

        Self {
            row_pins,
            col_pins,
            debouncer: Debouncer::new(),
            state: [0xFF; COLS],
            events,
            reset_combo: config.reset_combo,
            sample_period: config.sample_period,
            col: 0,
            slot: 0,
            warmup: (COLS * DEPTH) as u16,
            reset_armed: false,
        }
    }

    /// Sample the currently selected column and raise edge events.
    ///
    /// Call once per sampling period. One call covers one column, so the
    /// debounce window refreshes every `COLS * DEPTH` calls.
    pub fn sample(&mut self) {
        let mut raw = 0u8;
        for (idx, pin) in self.row_pins.iter_mut().enumerate() {
            if pin.is_high().unwrap_or(true) {
                raw |= 1 << idx;
            }
        }

        let combined = self.debouncer.record(self.col, self.slot, raw);

        // a changed bit is a press edge when the whole window settled
        // closed, a release edge as soon as one open sample showed up
        let changed = self.state[self.col] ^ combined;
        let pressed = changed & !combined;
        let released = changed & combined;
        self.events.raise(self.col, pressed, released);

        self.state[self.col] = (self.state[self.col] & !pressed) | released;

        self.col += 1;
        if self.col == COLS {
            self.col = 0;
            self.slot += 1;
            if self.slot == DEPTH {
                self.slot = 0;
            }
        }

        self.check_reset_combo();
        self.select_column(self.col);
    }

    /// Request a host reset once per sustained hold of the reserved
    /// combination; re-arm only after one of the keys reads released.
    fn check_reset_combo(&mut self) {
        if self.warmup > 0 {
            // debounced state is not trustworthy until the window has
            // been refreshed once
            self.warmup -= 1;
            return;
        }
        let held = self
            .reset_combo
            .iter()
            .all(|pos| self.state[pos.col as usize] & (1 << pos.row) == 0);
        if held {
            if self.reset_armed {
                self.reset_armed = false;
                debug!("reset combination held");
                state::request_reset();
            }
        } else {
            self.reset_armed = true;
        }
    }

    /// Drive exactly one column active (low), all others inactive.
    fn select_column(&mut self, col: usize) {
        for (idx, pin) in self.col_pins.iter_mut().enumerate() {
            if idx == col {
                pin.set_low().ok();
            } else {
                pin.set_high().ok();
            }
        }
    }

    /// Forget all matrix state; every key reads released until resampled.
    pub fn reinit(&mut self) {
        self.debouncer.reset();
        self.state = [0xFF; COLS];
        self.events.clear();
        self.col = 0;
        self.slot = 0;
        self.warmup = (COLS * DEPTH) as u16;
        self.reset_armed = false;
        self.select_column(0);
    }

    /// Sample forever at the configured period.
    pub async fn run(&mut self) {
        let mut ticker = Ticker::every(self.sample_period);
        loop {
            ticker.next().await;
            if state::take_matrix_reinit() {
                self.reinit();
            }
            self.sample();
        }
    }
}
