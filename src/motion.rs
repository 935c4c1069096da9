use bitfield_struct::bitfield;
use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::defs::*;
use crate::ps2::Ps2Transport;
use crate::reg::Reg;
use crate::{Error, TrackPoint};

/// First byte of a movement packet.
#[bitfield(u8, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct PacketHeader {
  pub left: bool,
  pub right: bool,
  pub middle: bool,
  /// Always set by the device.
  pub sync: bool,
  pub x_sign: bool,
  pub y_sign: bool,
  pub x_overflow: bool,
  pub y_overflow: bool,
}

/// Button state, laid out like a boot-protocol mouse report.
#[bitfield(u8, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Buttons {
  pub left: bool,
  pub right: bool,
  pub middle: bool,
  #[bits(5)]
  __: u8,
}

/// One decoded movement packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Movement {
  pub buttons: Buttons,
  /// Positive to the right.
  pub dx: i16,
  /// Positive away from the user.
  pub dy: i16,
  pub x_overflow: bool,
  pub y_overflow: bool,
}

impl Movement {
  pub fn from_packet(packet: [u8; 3]) -> Self {
    let header = PacketHeader::from_bits(packet[0]);
    Self {
      buttons: Buttons::new().with_left(header.left()).with_right(header.right()).with_middle(header.middle()),
      dx: delta(packet[1], header.x_sign()),
      dy: delta(packet[2], header.y_sign()),
      x_overflow: header.x_overflow(),
      y_overflow: header.y_overflow(),
    }
  }

  pub fn is_still(&self) -> bool {
    self.dx == 0 && self.dy == 0
  }
}

// 9-bit two's complement: the sign lives in the header byte.
fn delta(low: u8, negative: bool) -> i16 {
  if negative {
    i16::from(low) - 256
  } else {
    i16::from(low)
  }
}

/// Host-facing mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
  pub buttons: Buttons,
  pub x: i8,
  /// Positive downwards, as USB HID expects.
  pub y: i8,
  pub vertical: i8,
  pub horizontal: i8,
}

/// Reports produced for one movement packet.
pub type Reports = Vec<MouseReport, 2>;

const SCROLL_LIMIT: i16 = 64;

/// Turns movement packets into mouse reports.
///
/// Motion while the middle button is held scrolls instead of moving the
/// pointer. A middle press and release without any scrolling in between is
/// passed on as a middle click.
#[derive(Debug, Clone)]
pub struct Pointer {
  divisor_h: i16,
  divisor_v: i16,
  previous: Buttons,
  scrolled: bool,
  rest_h: i16,
  rest_v: i16,
}

impl Pointer {
  pub const fn new(divisor_h: u8, divisor_v: u8) -> Self {
    Self {
      divisor_h: divisor(divisor_h),
      divisor_v: divisor(divisor_v),
      previous: Buttons::new(),
      scrolled: false,
      rest_h: 0,
      rest_v: 0,
    }
  }

  pub fn set_divisors(&mut self, horizontal: u8, vertical: u8) {
    self.divisor_h = divisor(horizontal);
    self.divisor_v = divisor(vertical);
  }

  pub fn update(&mut self, movement: &Movement) -> Reports {
    let mut reports = Reports::new();
    if movement.is_still() && movement.buttons == self.previous {
      return reports;
    }

    let x = movement.dx.clamp(-127, 127);
    let y = -movement.dy.clamp(-127, 127);

    if movement.buttons.middle() {
      let h = x.clamp(-SCROLL_LIMIT, SCROLL_LIMIT);
      let v = movement.dy.clamp(-SCROLL_LIMIT, SCROLL_LIMIT);
      if h != 0 || v != 0 {
        self.scrolled = true;
        self.rest_h += h;
        self.rest_v += v;
        let steps_h = self.rest_h / self.divisor_h;
        let steps_v = self.rest_v / self.divisor_v;
        self.rest_h -= steps_h * self.divisor_h;
        self.rest_v -= steps_v * self.divisor_v;

        if steps_h != 0 || steps_v != 0 {
          let report = MouseReport { vertical: steps_v as i8, horizontal: steps_h as i8, ..Default::default() };
          let _ = reports.push(report);
        }
      }
    } else if self.previous.middle() && !self.scrolled {
      let click = MouseReport { buttons: Buttons::new().with_middle(true), ..Default::default() };
      let _ = reports.push(click);
      let _ = reports.push(MouseReport::default());
    } else {
      self.scrolled = false;
      self.rest_h = 0;
      self.rest_v = 0;
      let report = MouseReport { buttons: movement.buttons, x: x as i8, y: y as i8, ..Default::default() };
      let _ = reports.push(report);
    }

    self.previous = movement.buttons;
    reports
  }
}

const fn divisor(value: u8) -> i16 {
  if value == 0 {
    1
  } else {
    value as i16
  }
}

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  /// Poll one movement packet (remote mode).
  pub fn read_movement(&mut self) -> Result<Movement, Error<E>> {
    self.command(&[READ_DATA])?;
    let packet = self.receive(3)?;
    Ok(Movement::from_packet([packet[0], packet[1], packet[2]]))
  }

  /// Switch between the precision and the normal sensitivity.
  pub fn set_precision_mode(&mut self, precise: bool) -> Result<(), Error<E>> {
    let value = if precise { self.precision_sensitivity } else { self.normal_sensitivity };
    self.write_ram(Reg::Snstvty, value)?;
    self.sensitivity = value;
    Ok(())
  }

  /// A [`Pointer`] using the session's scroll divisors.
  pub fn pointer(&self) -> Pointer {
    Pointer::new(self.scroll_divisor_h, self.scroll_divisor_v)
  }
}
