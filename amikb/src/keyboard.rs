//! The main-loop task: drains matrix edge events into the scancode queue
//! and drives the host link.

use embassy_futures::yield_now;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::KeyboardConfig;
use crate::event::PendingEvents;
use crate::fifo::{FIFO_CAPACITY, ScancodeFifo};
use crate::keymap::CAPS_LOCK;
use crate::protocol::{HostLink, INIT_KEYSTREAM, TERM_KEYSTREAM};
use crate::state;

pub struct Keyboard<'a, Clk, Dat, Rst, Led, const ROWS: usize, const COLS: usize, const FIFO: usize = FIFO_CAPACITY> {
    link: HostLink<Clk, Dat, Rst, Led>,
    fifo: ScancodeFifo<FIFO>,
    events: &'a PendingEvents<COLS>,
    config: KeyboardConfig<ROWS, COLS>,
}

impl<'a, Clk, Dat, Rst, Led, const ROWS: usize, const COLS: usize, const FIFO: usize>
    Keyboard<'a, Clk, Dat, Rst, Led, ROWS, COLS, FIFO>
where
    Clk: OutputPin,
    Dat: InputPin + OutputPin,
    Rst: OutputPin,
    Led: OutputPin,
{
    /// Takes ownership of the host-side lines: clock, data, reset and the
    /// Caps Lock indicator. The power-up marker pair is queued right away,
    /// ahead of any key event.
    pub fn new(
        clk: Clk,
        dat: Dat,
        rst: Rst,
        led: Led,
        events: &'a PendingEvents<COLS>,
        config: KeyboardConfig<ROWS, COLS>,
    ) -> Self {
        let mut keyboard = Self {
            link: HostLink::new(clk, dat, rst, led, config.timing),
            fifo: ScancodeFifo::new(),
            events,
            config,
        };
        keyboard.seed_power_up_stream();
        keyboard
    }

    /// Queue the marker pair the host expects before any key event.
    fn seed_power_up_stream(&mut self) {
        self.fifo.push(INIT_KEYSTREAM, false).ok();
        self.fifo.push(TERM_KEYSTREAM, false).ok();
    }

    /// One pass over all pending edge events, in scan order.
    ///
    /// Stops at the first event that does not fit in the queue so events
    /// never overtake each other under back-pressure; the bit stays set
    /// and a later pass resumes there.
    pub fn dispatch(&mut self) {
        for col in 0..COLS {
            for row in 0..ROWS {
                let bit = 1u8 << row;
                if self.events.pressed(col) & bit != 0 {
                    if self.emit(row, col, true) {
                        self.events.ack_pressed(col, bit);
                    } else {
                        return;
                    }
                } else if self.events.released(col) & bit != 0 {
                    if self.emit(row, col, false) {
                        self.events.ack_released(col, bit);
                    } else {
                        return;
                    }
                }
            }
        }
    }

    /// Translate and enqueue one edge. True when the event is consumed,
    /// false when the queue is full.
    fn emit(&mut self, row: usize, col: usize, pressed: bool) -> bool {
        let Some(code) = self.config.scancodes.get(row, col) else {
            // unassigned position, consume the edge without output
            return true;
        };
        self.register_key(code, pressed)
    }

    /// Queue one key event, applying the Caps Lock latch rule: only press
    /// edges reach the host, carrying the latched state as direction.
    fn register_key(&mut self, code: u8, mut pressed: bool) -> bool {
        if code == CAPS_LOCK {
            if !pressed {
                return true;
            }
            pressed = self.link.toggle_caps_lock();
        }
        match self.fifo.push(code, pressed) {
            Ok(()) => true,
            Err(_) => {
                debug!("scancode queue full, deferring events");
                false
            }
        }
    }

    /// Run the dispatcher and the host link forever.
    pub async fn run(&mut self) {
        loop {
            yield_now().await;
            if state::take_reset_request() {
                self.reset_host().await;
            }
            self.dispatch();
            self.link.service(&mut self.fifo).await;
        }
    }

    /// Give the host link one service slot: synchronize if needed, then
    /// try to transmit the oldest queued byte.
    pub async fn service(&mut self) {
        self.link.service(&mut self.fifo).await;
    }

    /// Hard-reset the host and bring every component back to its power-up
    /// state.
    pub async fn reset_host(&mut self) {
        info!("host reset");
        self.fifo.flush();
        self.link.pulse_reset().await;
        self.link.reinit();
        self.seed_power_up_stream();
        state::flag_matrix_reinit();
    }

    pub fn is_synchronized(&self) -> bool {
        self.link.is_synchronized()
    }

    pub fn retransmit_pending(&self) -> bool {
        self.link.retransmit_pending()
    }

    pub fn caps_lock(&self) -> bool {
        self.link.caps_lock()
    }

    pub fn fifo(&self) -> &ScancodeFifo<FIFO> {
        &self.fifo
    }

    pub fn fifo_mut(&mut self) -> &mut ScancodeFifo<FIFO> {
        &mut self.fifo
    }
}
