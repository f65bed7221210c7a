//! Startup configuration injected into the scanner and the keyboard task.

use embassy_time::Duration;

use crate::keymap::{self, ScancodeTable};

/// A matrix position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Wire timing of the host link.
///
/// Every bounded wait shares the same acknowledgment window.
#[derive(Copy, Clone, Debug)]
pub struct LinkTiming {
    /// Window in which the host must acknowledge a pulse or a frame.
    pub ack_timeout: Duration,
    /// Granularity of data-line polling.
    pub poll_step: Duration,
    /// Width of one clock/data pulse phase.
    pub pulse_width: Duration,
    /// Gap between the start-of-frame pulse and the first bit.
    pub frame_lead: Duration,
    /// Settle time after releasing the data line, before polling for the
    /// acknowledgment.
    pub settle: Duration,
    /// How long the host reset line is held asserted.
    pub reset_hold: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_micros(143_000),
            poll_step: Duration::from_micros(2),
            pulse_width: Duration::from_micros(20),
            frame_lead: Duration::from_micros(100),
            settle: Duration::from_micros(2),
            reset_hold: Duration::from_millis(500),
        }
    }
}

/// Everything the firmware needs to know about a particular keyboard:
/// geometry comes from the const generics, the rest from here.
#[derive(Copy, Clone)]
pub struct KeyboardConfig<const ROWS: usize, const COLS: usize> {
    /// Matrix position to scancode translation table.
    pub scancodes: &'static ScancodeTable<ROWS, COLS>,
    /// Reserved combination that hard-resets the host when all three
    /// positions read pressed at once.
    pub reset_combo: [KeyPos; 3],
    /// Matrix sampling period; one column is sampled per tick.
    pub sample_period: Duration,
    /// Host link wire timing.
    pub timing: LinkTiming,
}

impl<const ROWS: usize, const COLS: usize> KeyboardConfig<ROWS, COLS> {
    pub fn new(scancodes: &'static ScancodeTable<ROWS, COLS>, reset_combo: [KeyPos; 3]) -> Self {
        Self {
            scancodes,
            reset_combo,
            sample_period: Duration::from_millis(5),
            timing: LinkTiming::default(),
        }
    }
}

impl Default for KeyboardConfig<6, 16> {
    /// The Amiga 500 German (Rev. A) board.
    fn default() -> Self {
        Self::new(&keymap::A500_DE, keymap::A500_RESET_COMBO)
    }
}
