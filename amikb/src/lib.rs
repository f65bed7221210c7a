#![no_std]

//! Firmware core for an Amiga 500 keyboard controller.
//!
//! The crate turns a switch matrix into the Amiga synchronous serial
//! keyboard protocol. Two cooperative tasks share the work:
//!
//! - [`Matrix`] samples one matrix column per tick, debounces the raw
//!   readings and raises press/release edges into [`PendingEvents`].
//! - [`Keyboard`] drains those edges into the outgoing [`ScancodeFifo`]
//!   and drives the two-wire host link: synchronization handshake,
//!   bit-banged frames, acknowledgment timeouts and retransmission.
//!
//! Pin access goes through `embedded-hal` digital traits, timing through
//! `embassy-time`; board support (clocks, executor, pin muxing) lives
//! outside this crate and hands the pins to [`run`].

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod config;
pub mod debounce;
pub mod event;
pub mod fifo;
pub mod keyboard;
pub mod keymap;
pub mod matrix;
pub mod protocol;
pub mod state;

use embassy_futures::join::join;
use embedded_hal::digital::{InputPin, OutputPin};

pub use config::{KeyPos, KeyboardConfig, LinkTiming};
pub use event::PendingEvents;
pub use fifo::ScancodeFifo;
pub use keyboard::Keyboard;
pub use keymap::ScancodeTable;
pub use matrix::Matrix;

/// Run the scanner task and the keyboard task side by side, forever.
pub async fn run<In, Out, Clk, Dat, Rst, Led, const ROWS: usize, const COLS: usize, const DEPTH: usize, const FIFO: usize>(
    matrix: &mut Matrix<'_, In, Out, ROWS, COLS, DEPTH>,
    keyboard: &mut Keyboard<'_, Clk, Dat, Rst, Led, ROWS, COLS, FIFO>,
) where
    In: InputPin,
    Out: OutputPin,
    Clk: OutputPin,
    Dat: InputPin + OutputPin,
    Rst: OutputPin,
    Led: OutputPin,
{
    join(matrix.run(), keyboard.run()).await;
}
