use embedded_hal::delay::DelayNs;

use crate::defs::*;
use crate::ps2::Ps2Transport;
use crate::{Error, TrackPoint};

/// Reply to `STATUS REQUEST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
  pub flags: u8,
  pub resolution: u8,
  pub sample_rate: u8,
}

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  // Standard mouse commands

  pub fn enable_reporting(&mut self) -> Result<(), Error<E>> {
    self.command(&[ENABLE])
  }

  pub fn disable_reporting(&mut self) -> Result<(), Error<E>> {
    self.command(&[DISABLE])
  }

  /// The device reports only when asked with [`TrackPoint::read_movement`].
  pub fn set_remote_mode(&mut self) -> Result<(), Error<E>> {
    self.command(&[SET_REMOTE_MODE])
  }

  pub fn set_stream_mode(&mut self) -> Result<(), Error<E>> {
    self.command(&[SET_STREAM_MODE])
  }

  pub fn set_defaults(&mut self) -> Result<(), Error<E>> {
    self.command(&[SET_DEFAULTS])
  }

  pub fn set_sampling_rate(&mut self, rate: u8) -> Result<(), Error<E>> {
    self.command(&[SET_SAMPLING_RATE, rate])
  }

  pub fn set_resolution(&mut self, resolution: u8) -> Result<(), Error<E>> {
    self.command(&[SET_RESOLUTION, resolution])
  }

  /// `true` selects 2:1 scaling.
  pub fn set_scaling(&mut self, double: bool) -> Result<(), Error<E>> {
    self.command(&[if double { SET_SCALING_2_1 } else { RESET_SCALING }])
  }

  pub fn set_wrap_mode(&mut self, wrap: bool) -> Result<(), Error<E>> {
    self.command(&[if wrap { SET_WRAP_MODE } else { RESET_WRAP_MODE }])
  }

  pub fn status_request(&mut self) -> Result<Status, Error<E>> {
    self.command(&[STATUS_REQUEST])?;
    let r = self.receive(3)?;
    Ok(Status { flags: r[0], resolution: r[1], sample_rate: r[2] })
  }

  pub fn read_device_type(&mut self) -> Result<u8, Error<E>> {
    self.command(&[READ_DEVICE_TYPE])?;
    self.receive(1).map(|r| r[0])
  }

  pub fn read_secondary_id(&mut self) -> Result<[u8; 2], Error<E>> {
    self.command(&[READ_SECONDARY_ID])?;
    self.receive(2).map(|r| [r[0], r[1]])
  }

  // TrackPoint extended commands

  pub fn read_rom_version(&mut self) -> Result<u8, Error<E>> {
    self.command(&[EXT, READ_ROM_VERSION])?;
    self.receive(1).map(|r| r[0])
  }

  /// Enter hard transparent mode. Only a power-on reset leaves it.
  pub fn set_hard_transparent_mode(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, SET_HARD_TRANS_MODE])
  }

  pub fn set_soft_transparent_mode(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, SET_SOFT_TRANS_MODE])
  }

  pub fn cancel_soft_transparent_mode(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, CANCEL_SOFT_TRANS_MODE])
  }

  /// Enable or disable the external pointing device port.
  pub fn set_external_device(&mut self, enable: bool) -> Result<(), Error<E>> {
    self.command(&[EXT, if enable { ENABLE_EXT_POINT_DEV } else { DISABLE_EXT_POINT_DEV }])
  }

  pub fn force_recalibration(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, FORCE_RECALIBRATION])
  }

  pub fn tactile_pulse(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, TACTILE_OUTPUT_PULSE])
  }

  pub fn power_down(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, POWER_DOWN])
  }

  pub fn toggle_middle_button_blocking(&mut self) -> Result<(), Error<E>> {
    self.command(&[EXT, TOGGLE_BLOCK_MIDDLE_BUTTON])
  }
}
