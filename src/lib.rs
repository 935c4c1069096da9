#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Blocking, `no_std` driver for IBM/Lenovo TrackPoint pointing sticks
//! attached to a PS/2 host port.
//!
//! The TrackPoint speaks the standard PS/2 mouse command set plus an extended
//! family of commands (prefix `0xE2`) that give access to its internal RAM. This
//! crate builds on that to offer:
//!
//! - A command engine that validates every acknowledgement and retries a byte
//!   once when the device asks for a resend
//! - Byte and bit access to the device RAM, with the named locations of the
//!   TrackPoint engineering specification in [`reg`]
//! - Power-on and soft reset handling with self-test interpretation
//! - Configuration snapshots holding only the settings that differ from the
//!   documented defaults, ready to persist and to replay after a reset
//! - A parser for the Plug and Play extended identification string
//! - Movement polling and a small pointer/scroll translator
//! - A bit-banged PS/2 host with an interrupt-fed receive queue (see [`ps2`])
//!
//! ```ignore
//! use embedded_hal::delay::DelayNs;
//! use trackpoint::{Config, SettingsStore, TrackPoint, ps2::Ps2Transport};
//!
//! fn bring_up<P, D, S>(ps2: P, delay: D, store: &mut S) -> Result<(), trackpoint::Error<P::Error>>
//! where
//!   P: Ps2Transport,
//!   D: DelayNs,
//!   S: SettingsStore,
//! {
//!   let mut tp = TrackPoint::new(ps2, delay, Config::default());
//!   tp.init(store)?;
//!   let movement = tp.read_movement()?;
//!   Ok(())
//! }
//! ```

#[macro_use]
mod fmt;

mod config;
mod defs;
mod device;
mod ext_id;
mod init;
mod motion;
pub mod ps2;
pub mod reg;
mod rw;
mod settings;
mod snapshot;
mod table;

#[cfg(test)]
mod mock;

use embedded_hal::delay::DelayNs;

pub use config::Config;
use defs::*;
pub use device::Status;
pub use ext_id::{ExtendedId, ExtendedIdParser};
pub use init::ResetKind;
pub use motion::{Buttons, MouseReport, Movement, PacketHeader, Pointer, Reports};
use ps2::Ps2Transport;
pub use ps2::Ps2Error;
pub use reg::{ConfigFlags, PostResult, Reg};
pub use settings::{Eeprom, EepromSettings, MemoryEeprom, OutOfRange, SettingKind, SettingsStore, EEPROM_FOOTPRINT};
pub use snapshot::Snapshot;
pub use table::{Persistence, RamEntry, RegisterTable, Variant, MAX_CONFIG_LOCATIONS};

/// Errors that can occur while talking to the TrackPoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// The session is not initialized. Nothing was sent.
  Disabled,
  /// The PS/2 link failed with the underlying transport error.
  Transport(E),
  /// The device answered a command byte with ERROR.
  BadResponse,
  /// Protocol violation: a second RESEND or an unknown acknowledgement.
  Fail,
  /// Self-test did not pass. Carries the completion code the device sent.
  PostFail(u8),
  /// The location is missing from the register table.
  NotFound(u8),
  /// The settings store refused to save.
  Storage,
}

/// One TrackPoint attached to a PS/2 port.
///
/// The session owns the transport and a delay provider and caches the
/// sensitivity and scroll settings that live outside the device RAM. Create it
/// with [`TrackPoint::new`], then call [`TrackPoint::init`]; every operation
/// that touches the wire returns [`Error::Disabled`] until initialization has
/// succeeded.
pub struct TrackPoint<P, D> {
  ps2: P,
  delay: D,
  config: Config,
  initialized: bool,
  booted: bool,
  response: [u8; RESPONSE_LEN],
  sensitivity: u8,
  normal_sensitivity: u8,
  precision_sensitivity: u8,
  scroll_divisor_h: u8,
  scroll_divisor_v: u8,
}

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  /// Create a session. Nothing is sent until [`TrackPoint::init`].
  pub fn new(ps2: P, delay: D, config: Config) -> Self {
    Self {
      ps2,
      delay,
      initialized: false,
      booted: false,
      response: [0; RESPONSE_LEN],
      sensitivity: config.normal_sensitivity,
      normal_sensitivity: config.normal_sensitivity,
      precision_sensitivity: config.precision_sensitivity,
      scroll_divisor_h: config.scroll_divisor_h,
      scroll_divisor_v: config.scroll_divisor_v,
      config,
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  /// Stop talking to the device. Operations return [`Error::Disabled`] until
  /// the next successful [`TrackPoint::init`].
  pub fn disable(&mut self) {
    self.initialized = false;
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Sensitivity currently programmed into the device.
  pub fn sensitivity(&self) -> u8 {
    self.sensitivity
  }

  pub fn normal_sensitivity(&self) -> u8 {
    self.normal_sensitivity
  }

  pub fn set_normal_sensitivity(&mut self, value: u8) {
    self.normal_sensitivity = value;
  }

  pub fn precision_sensitivity(&self) -> u8 {
    self.precision_sensitivity
  }

  pub fn set_precision_sensitivity(&mut self, value: u8) {
    self.precision_sensitivity = value;
  }

  /// Horizontal and vertical scroll divisors.
  pub fn scroll_divisors(&self) -> (u8, u8) {
    (self.scroll_divisor_h, self.scroll_divisor_v)
  }

  pub fn set_scroll_divisors(&mut self, horizontal: u8, vertical: u8) {
    self.scroll_divisor_h = horizontal;
    self.scroll_divisor_v = vertical;
  }

  /// Bytes received for the most recent command.
  pub fn response(&self) -> &[u8; RESPONSE_LEN] {
    &self.response
  }

  /// Give back the transport and delay provider.
  pub fn release(self) -> (P, D) {
    (self.ps2, self.delay)
  }

  fn ensure_enabled(&self) -> Result<(), Error<E>> {
    if self.initialized {
      Ok(())
    } else {
      Err(Error::Disabled)
    }
  }
}
