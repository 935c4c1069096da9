use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::frame::odd_parity;
use super::{Ps2Error, Ps2Transport, RxQueue, RECEIVE_STEP};

/// Default time to wait for a response byte.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u32 = 500;

// Line wait budgets in microseconds.
const START_BUDGET_US: u32 = 15_000;
const EDGE_BUDGET_US: u32 = 50;
const POLL_STEP_US: u32 = 10;

#[derive(Clone, Copy)]
enum Line {
  Clock,
  Data,
}

/// Bit-banged PS/2 host over two open-drain pins.
///
/// Writing a pin high releases the line; the device or a pull-up does the
/// rest. Reception happens in the clock interrupt through the [`Ps2Receiver`]
/// paired with `rx`.
///
/// [`Ps2Receiver`]: super::Ps2Receiver
pub struct Ps2Host<'a, CLK, DAT, D, const N: usize> {
  clk: CLK,
  dat: DAT,
  delay: D,
  rx: RxQueue<'a, N>,
  receive_timeout_ms: u32,
  dropped_seen: u8,
}

impl<'a, CLK, DAT, D, const N: usize> Ps2Host<'a, CLK, DAT, D, N>
where
  CLK: InputPin + OutputPin,
  DAT: InputPin + OutputPin,
  D: DelayNs,
{
  pub fn new(clk: CLK, dat: DAT, delay: D, rx: RxQueue<'a, N>) -> Self {
    Self { clk, dat, delay, rx, receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS, dropped_seen: 0 }
  }

  pub fn with_receive_timeout(mut self, ms: u32) -> Self {
    self.receive_timeout_ms = ms;
    self
  }

  /// Release both lines so the device may transmit.
  pub fn idle(&mut self) -> Result<(), Ps2Error> {
    self.clk.set_high().map_err(|_| Ps2Error::Line)?;
    self.dat.set_high().map_err(|_| Ps2Error::Line)
  }

  /// Hold the clock low so the device buffers its output.
  pub fn inhibit(&mut self) -> Result<(), Ps2Error> {
    self.clk.set_low().map_err(|_| Ps2Error::Line)?;
    self.dat.set_high().map_err(|_| Ps2Error::Line)
  }

  pub fn release(self) -> (CLK, DAT, D, RxQueue<'a, N>) {
    (self.clk, self.dat, self.delay, self.rx)
  }

  fn transmit(&mut self, byte: u8) -> Result<(), Ps2Error> {
    // Abort anything the device is sending.
    self.inhibit()?;
    self.delay.delay_us(100);

    // Request-to-send: start bit with the clock released.
    self.set_data(false)?;
    self.clk.set_high().map_err(|_| Ps2Error::Line)?;
    self.wait(Line::Clock, false, START_BUDGET_US, 1)?;

    for i in 0..8 {
      self.delay.delay_us(15);
      self.set_data(byte & (1 << i) != 0)?;
      self.wait(Line::Clock, true, EDGE_BUDGET_US, 2)?;
      self.wait(Line::Clock, false, EDGE_BUDGET_US, 3)?;
    }

    self.delay.delay_us(15);
    self.set_data(odd_parity(byte))?;
    self.wait(Line::Clock, true, EDGE_BUDGET_US, 4)?;
    self.wait(Line::Clock, false, EDGE_BUDGET_US, 5)?;

    // Stop bit, then the device pulls data low to acknowledge.
    self.delay.delay_us(15);
    self.set_data(true)?;
    self.wait(Line::Data, false, EDGE_BUDGET_US, 6)?;
    self.wait(Line::Clock, false, EDGE_BUDGET_US, 7)?;

    self.wait(Line::Clock, true, EDGE_BUDGET_US, 8)?;
    self.wait(Line::Data, true, EDGE_BUDGET_US, 9)
  }

  fn set_data(&mut self, high: bool) -> Result<(), Ps2Error> {
    let result = if high { self.dat.set_high() } else { self.dat.set_low() };
    result.map_err(|_| Ps2Error::Line)
  }

  // Bytes the interrupt had to drop since the last look.
  fn note_overruns(&mut self) -> u8 {
    let dropped = self.rx.dropped();
    let lost = dropped.wrapping_sub(self.dropped_seen);
    if lost != 0 {
      warn!("ps2: receive queue overrun, {=u8} bytes lost", lost);
      self.dropped_seen = dropped;
    }
    lost
  }

  fn wait(&mut self, line: Line, high: bool, budget_us: u32, step: u8) -> Result<(), Ps2Error> {
    for _ in 0..budget_us {
      let level = match line {
        Line::Clock => self.clk.is_high().map_err(|_| Ps2Error::Line),
        Line::Data => self.dat.is_high().map_err(|_| Ps2Error::Line),
      }?;
      if level == high {
        return Ok(());
      }
      self.delay.delay_us(1);
    }
    Err(Ps2Error::Timeout(step))
  }
}

impl<'a, CLK, DAT, D, const N: usize> Ps2Transport for Ps2Host<'a, CLK, DAT, D, N>
where
  CLK: InputPin + OutputPin,
  DAT: InputPin + OutputPin,
  D: DelayNs,
{
  type Error = Ps2Error;

  fn send(&mut self, byte: u8) -> Result<u8, Ps2Error> {
    self.rx.clear();
    self.rx.set_busy(true);
    let sent = self.transmit(byte);
    self.rx.set_busy(false);
    let idle = self.idle();

    if let Err(e) = sent {
      warn!("ps2: send {=u8:#x} failed", byte);
      return Err(e);
    }
    idle?;
    self.receive()
  }

  fn receive(&mut self) -> Result<u8, Ps2Error> {
    self.note_overruns();
    let polls = self.receive_timeout_ms.saturating_mul(1000) / POLL_STEP_US;
    for _ in 0..=polls {
      if let Some(received) = self.rx.dequeue() {
        return received;
      }
      self.delay.delay_us(POLL_STEP_US);
    }
    Err(Ps2Error::Timeout(RECEIVE_STEP))
  }
}
