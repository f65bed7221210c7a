//! The Amiga host link: synchronization handshake and frame transmission.
//!
//! Two open-drain wires, clock and data, both idle high. The data line is
//! inverted: driving it low puts a logical 1 on the wire, and the host
//! acknowledges by pulling it low itself. A frame is 8 bits MSB-first,
//! seven scancode bits plus the direction bit, and every frame (as well as
//! the handshake pulse) must be acknowledged within a bounded window.

use embassy_time::{Instant, Timer};
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::LinkTiming;
use crate::fifo::{ScancodeFifo, encode};
use crate::state;

/// Reset warning, sent before a host reset. Reserved, never transmitted.
pub const RESET_WARNING: u8 = 0x78;
/// The previous keycode was lost; a retransmission follows.
pub const LAST_KEYCODE_BAD: u8 = 0xF9;
/// The outgoing keycode buffer overflowed. Reserved, never transmitted.
pub const KEYBUFFER_FULL: u8 = 0xFA;
/// The controller self test failed. Reserved, never transmitted.
pub const SELFTEST_FAILED: u8 = 0xFC;
/// Start of the power-up key stream.
pub const INIT_KEYSTREAM: u8 = 0xFD;
/// End of the power-up key stream.
pub const TERM_KEYSTREAM: u8 = 0xFE;

/// Owns the four host-side lines and the link state machine.
///
/// Starts out unsynchronized, which forces the handshake before the first
/// frame. The Caps Lock indicator comes up lit and follows the latch once
/// the first handshake completes.
pub struct HostLink<Clk, Dat, Rst, Led> {
    clk: Clk,
    dat: Dat,
    rst: Rst,
    led: Led,
    timing: LinkTiming,
    synchronized: bool,
    retransmit: bool,
    caps_lock: bool,
}

impl<Clk, Dat, Rst, Led> HostLink<Clk, Dat, Rst, Led>
where
    Clk: OutputPin,
    Dat: InputPin + OutputPin,
    Rst: OutputPin,
    Led: OutputPin,
{
    pub(crate) fn new(mut clk: Clk, mut dat: Dat, mut rst: Rst, mut led: Led, timing: LinkTiming) -> Self {
        clk.set_high().ok();
        dat.set_high().ok();
        rst.set_high().ok();
        led.set_high().ok();
        Self {
            clk,
            dat,
            rst,
            led,
            timing,
            synchronized: false,
            retransmit: false,
            caps_lock: false,
        }
    }

    pub(crate) fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    pub(crate) fn retransmit_pending(&self) -> bool {
        self.retransmit
    }

    pub(crate) fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    /// Flip the Caps Lock latch, mirror it on the indicator and return the
    /// new latched state.
    pub(crate) fn toggle_caps_lock(&mut self) -> bool {
        self.caps_lock = !self.caps_lock;
        self.drive_caps_led();
        self.caps_lock
    }

    fn drive_caps_led(&mut self) {
        if self.caps_lock {
            self.led.set_high().ok();
        } else {
            self.led.set_low().ok();
        }
    }

    // The data line is inverted: asserted means electrically low.
    fn assert_data(&mut self) {
        self.dat.set_low().ok();
    }

    fn release_data(&mut self) {
        self.dat.set_high().ok();
    }

    fn data_released(&mut self) -> bool {
        self.dat.is_high().unwrap_or(true)
    }

    /// Clock out a single 1 bit, the synchronization pulse.
    async fn clock_sync_pulse(&mut self) {
        let t = self.timing.pulse_width;
        self.assert_data();
        Timer::after(t).await;
        self.clk.set_low().ok();
        Timer::after(t).await;
        self.clk.set_high().ok();
        Timer::after(t).await;
        self.release_data();
    }

    /// Poll until the host pulls the data line low or the window closes.
    async fn wait_ack(&mut self) -> bool {
        let deadline = Instant::now() + self.timing.ack_timeout;
        loop {
            if !self.data_released() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            Timer::after(self.timing.poll_step).await;
        }
    }

    /// Poll until the host releases the data line or the window closes.
    async fn wait_data_released(&mut self) -> bool {
        let deadline = Instant::now() + self.timing.ack_timeout;
        loop {
            if self.data_released() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            Timer::after(self.timing.poll_step).await;
        }
    }

    /// Block until the host leaves the data line idle. Unbounded, but
    /// bails out when an operator reset is waiting so the main loop can
    /// run it.
    async fn wait_host_idle(&mut self) -> bool {
        loop {
            if self.data_released() {
                return true;
            }
            if state::reset_requested() {
                return false;
            }
            Timer::after(self.timing.poll_step).await;
        }
    }

    /// Re-establish the handshake. Repeats the synchronization pulse until
    /// the host acknowledges; a pending operator reset aborts between
    /// attempts.
    ///
    /// Returns true when the link is synchronized and any pending
    /// retransmission has been dealt with.
    pub(crate) async fn resynchronize(&mut self) -> bool {
        if !self.wait_host_idle().await {
            return false;
        }
        while !self.synchronized {
            self.clock_sync_pulse().await;
            if self.wait_ack().await {
                self.synchronized = true;
            } else if state::reset_requested() {
                return false;
            }
        }
        info!("host link synchronized");
        self.drive_caps_led();
        if self.retransmit {
            // tell the host the last keycode was lost before resuming the
            // queue; failure of the sentinel itself drops the link again
            self.retransmit = false;
            self.synchronized = self.send_frame(encode(LAST_KEYCODE_BAD, false)).await;
        }
        self.synchronized
    }

    /// Transmit one encoded byte. On success the caller commits the
    /// queue; on a timeout the link drops out of sync and the byte must
    /// stay queued for the sentinel-prefixed retry.
    pub(crate) async fn transmit(&mut self, byte: u8) -> bool {
        if self.send_frame(byte).await {
            true
        } else {
            warn!("host ack timeout, scheduling retransmission");
            self.synchronized = false;
            self.retransmit = true;
            false
        }
    }

    async fn send_frame(&mut self, byte: u8) -> bool {
        if !self.wait_data_released().await {
            return false;
        }
        let t = self.timing.pulse_width;

        // start-of-frame pulse
        self.assert_data();
        Timer::after(t).await;
        self.release_data();
        Timer::after(self.timing.frame_lead).await;

        for bit in 0..8 {
            // inverted line: a 1 bit drives the wire low
            if byte & (0x80 >> bit) != 0 {
                self.dat.set_low().ok();
            } else {
                self.dat.set_high().ok();
            }
            Timer::after(t).await;
            self.clk.set_low().ok();
            Timer::after(t).await;
            self.clk.set_high().ok();
            Timer::after(t).await;
        }

        self.release_data();
        Timer::after(self.timing.settle).await;
        self.wait_ack().await
    }

    /// Give the link one service slot: synchronize if needed, then try to
    /// transmit the oldest queued byte.
    pub(crate) async fn service<const N: usize>(&mut self, fifo: &mut ScancodeFifo<N>) {
        if !self.synchronized && !self.resynchronize().await {
            return;
        }
        if let Some(byte) = fifo.peek() {
            if self.transmit(byte).await {
                fifo.pop();
            }
        }
    }

    /// Pulse the host reset line.
    pub(crate) async fn pulse_reset(&mut self) {
        self.rst.set_low().ok();
        Timer::after(self.timing.reset_hold).await;
        self.rst.set_high().ok();
    }

    /// Back to the power-up state: out of sync, nothing pending, Caps Lock
    /// cleared with the indicator lit until the next handshake.
    pub(crate) fn reinit(&mut self) {
        self.synchronized = false;
        self.retransmit = false;
        self.caps_lock = false;
        self.clk.set_high().ok();
        self.dat.set_high().ok();
        self.led.set_high().ok();
    }
}
