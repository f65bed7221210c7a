#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::future::Future;
use std::rc::Rc;

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_time::{Duration, Instant, MockDriver};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use amikb::{Keyboard, KeyboardConfig, PendingEvents};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub static MAX_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Drive the mock clock forward until the scenario under `select` wins.
async fn pump_time(limit: Duration) {
    let step = Duration::from_micros(50);
    let mut elapsed = Duration::from_micros(0);
    loop {
        MockDriver::get().advance(step);
        elapsed += step;
        assert!(elapsed <= limit, "test timeout reached");
        yield_now().await;
    }
}

/// Run an async scenario to completion while the mock clock advances.
pub fn run_scenario<F: Future>(fut: F) -> F::Output {
    block_on(async {
        match select(fut, pump_time(MAX_TEST_TIMEOUT)).await {
            Either::First(out) => out,
            Either::Second(_) => unreachable!(),
        }
    })
}

/// Scripted host on the far end of the clock/data pair.
///
/// Every device-side pin operation updates this state machine
/// synchronously. Clock falling edges sample the data level the device is
/// driving; when the device polls the data line while an acknowledgment
/// window is open (`ack_budget` > 0 and at least one pulse was clocked),
/// the host pulls the line low once and the completed frame, if any, is
/// captured as its logical byte.
pub struct HostSim {
    /// Level the device drives onto the data line (true = high).
    dat_level: bool,
    /// Clock pulses since the last acknowledgment.
    pub pulses: u32,
    /// Data levels sampled at each clock falling edge.
    bits: Vec<bool>,
    /// How many acknowledgment windows the host will still honor.
    pub ack_budget: u32,
    pub acks_given: u32,
    /// Completed 8-bit frames, decoded back to logical bytes.
    pub captured: Vec<u8>,
    /// Reset line transitions (level, timestamp).
    pub rst_events: Vec<(bool, Instant)>,
    /// Caps Lock indicator level.
    pub led: bool,
}

impl HostSim {
    fn new() -> Self {
        Self {
            dat_level: true,
            pulses: 0,
            bits: Vec::new(),
            ack_budget: 0,
            acks_given: 0,
            captured: Vec::new(),
            rst_events: Vec::new(),
            led: false,
        }
    }

    fn on_clk_falling(&mut self) {
        self.pulses += 1;
        self.bits.push(self.dat_level);
    }

    /// The device is sampling the data line. Returns true when the host
    /// pulls it low (acknowledgment).
    fn poll_host_pull(&mut self) -> bool {
        if self.pulses > 0 && self.ack_budget > 0 {
            self.ack_budget -= 1;
            self.acks_given += 1;
            if self.bits.len() == 8 {
                // inverted line: low level = logical 1
                let byte = self.bits.iter().fold(0u8, |b, &lvl| (b << 1) | (!lvl) as u8);
                self.captured.push(byte);
            }
            self.bits.clear();
            self.pulses = 0;
            true
        } else {
            false
        }
    }

    /// Forget pulses left over from a timed-out exchange. Call between
    /// scenario phases before granting a fresh `ack_budget`.
    pub fn flush_stale(&mut self) {
        self.pulses = 0;
        self.bits.clear();
    }
}

pub struct ClkPin(Rc<RefCell<HostSim>>);
pub struct DatPin(Rc<RefCell<HostSim>>);
pub struct RstPin(Rc<RefCell<HostSim>>);
pub struct LedPin(Rc<RefCell<HostSim>>);

impl ErrorType for ClkPin {
    type Error = Infallible;
}

impl OutputPin for ClkPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().on_clk_falling();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl ErrorType for DatPin {
    type Error = Infallible;
}

impl OutputPin for DatPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dat_level = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dat_level = true;
        Ok(())
    }
}

impl InputPin for DatPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow_mut().poll_host_pull())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

impl ErrorType for RstPin {
    type Error = Infallible;
}

impl OutputPin for RstPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().rst_events.push((false, Instant::now()));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().rst_events.push((true, Instant::now()));
        Ok(())
    }
}

impl ErrorType for LedPin {
    type Error = Infallible;
}

impl OutputPin for LedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().led = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().led = true;
        Ok(())
    }
}

pub fn host_sim() -> (Rc<RefCell<HostSim>>, ClkPin, DatPin, RstPin, LedPin) {
    let sim = Rc::new(RefCell::new(HostSim::new()));
    (
        sim.clone(),
        ClkPin(sim.clone()),
        DatPin(sim.clone()),
        RstPin(sim.clone()),
        LedPin(sim),
    )
}

pub const ROWS: usize = 6;
pub const COLS: usize = 16;

/// Switch matrix as the scanner sees it: one driven column, pulled-up
/// rows reading low where a held key closes a contact.
pub struct MatrixSim {
    pub active_col: usize,
    pub held: [[bool; COLS]; ROWS],
}

pub struct RowPin {
    sim: Rc<RefCell<MatrixSim>>,
    row: usize,
}

pub struct ColPin {
    sim: Rc<RefCell<MatrixSim>>,
    col: usize,
}

impl ErrorType for RowPin {
    type Error = Infallible;
}

impl InputPin for RowPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        let sim = self.sim.borrow();
        Ok(!sim.held[self.row][sim.active_col])
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

impl ErrorType for ColPin {
    type Error = Infallible;
}

impl OutputPin for ColPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.sim.borrow_mut().active_col = self.col;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

pub fn matrix_sim() -> (Rc<RefCell<MatrixSim>>, [RowPin; ROWS], [ColPin; COLS]) {
    let sim = Rc::new(RefCell::new(MatrixSim {
        active_col: 0,
        held: [[false; COLS]; ROWS],
    }));
    let rows = std::array::from_fn(|row| RowPin { sim: sim.clone(), row });
    let cols = std::array::from_fn(|col| ColPin { sim: sim.clone(), col });
    (sim, rows, cols)
}

pub type TestKeyboard = Keyboard<'static, ClkPin, DatPin, RstPin, LedPin, 6, 16>;

/// A keyboard with the reference layout wired to a [`HostSim`].
pub fn test_keyboard() -> (TestKeyboard, Rc<RefCell<HostSim>>) {
    let (sim, clk, dat, rst, led) = host_sim();
    let events: &'static PendingEvents<16> = Box::leak(Box::new(PendingEvents::new()));
    let keyboard = Keyboard::new(clk, dat, rst, led, events, KeyboardConfig::default());
    (keyboard, sim)
}
