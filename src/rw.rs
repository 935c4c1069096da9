use embedded_hal::delay::DelayNs;

use crate::defs::*;
use crate::ps2::Ps2Transport;
use crate::reg::{ConfigFlags, Reg, NEAR_LIMIT};
use crate::{Error, TrackPoint};

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  /// Send a command sequence, checking the acknowledgement of every byte.
  ///
  /// Stops at the first byte that fails. Response bytes, if any, are collected
  /// afterwards with [`TrackPoint::receive`].
  pub fn command(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
    self.ensure_enabled()?;

    for (i, &byte) in bytes.iter().enumerate() {
      if let Err(e) = self.send_command_byte(byte) {
        warn!("command byte {} of {} ({=u8:#x}) failed", i + 1, bytes.len(), byte);
        return Err(e);
      }
    }
    Ok(())
  }

  /// Send one byte. A RESEND is honoured once; a second one is a protocol
  /// violation.
  fn send_command_byte(&mut self, byte: u8) -> Result<(), Error<E>> {
    let mut ack = 0;
    for _ in 0..2 {
      ack = self.ps2.send(byte).map_err(Error::Transport)?;
      match ack {
        ACK => return Ok(()),
        ERROR => return Err(Error::BadResponse),
        RESEND => {
          debug!("resend requested for {=u8:#x}", byte);
          continue;
        }
        _ => break,
      }
    }
    warn!("byte {=u8:#x} answered with {=u8:#x}", byte, ack);
    Err(Error::Fail)
  }

  /// Receive `n` response bytes into the response buffer.
  ///
  /// The buffer is zeroed first so a short response never carries bytes of an
  /// earlier one. Asking for more than four bytes fails with [`Error::Fail`]
  /// before anything is read.
  pub fn receive(&mut self, n: usize) -> Result<&[u8], Error<E>> {
    self.ensure_enabled()?;
    if n > RESPONSE_LEN {
      warn!("receive of {} bytes exceeds the response buffer", n);
      return Err(Error::Fail);
    }
    self.response = [0; RESPONSE_LEN];

    for i in 0..n {
      self.response[i] = self.ps2.receive().map_err(Error::Transport)?;
    }
    Ok(&self.response[..n])
  }

  /// Read one RAM location.
  pub fn read_ram(&mut self, location: impl Into<u8>) -> Result<u8, Error<E>> {
    let location = location.into();
    if location <= NEAR_LIMIT {
      self.command(&[EXT, location])?;
    } else {
      self.command(&[EXT, RAM_READ_FAR, location])?;
    }
    self.receive(1)?;
    Ok(self.response[0])
  }

  /// Write one RAM location.
  pub fn write_ram(&mut self, location: impl Into<u8>, value: u8) -> Result<(), Error<E>> {
    self.command(&[EXT, RAM_WRITE, location.into(), value])
  }

  /// XOR one RAM location with `mask` on the device.
  pub fn xor_ram(&mut self, location: impl Into<u8>, mask: u8) -> Result<(), Error<E>> {
    self.command(&[EXT, RAM_XOR, location.into(), mask])
  }

  pub fn get_bit(&mut self, location: impl Into<u8>, bit: u8) -> Result<bool, Error<E>> {
    Ok(self.read_ram(location)? & mask(bit) != 0)
  }

  pub fn set_bit(&mut self, location: impl Into<u8>, bit: u8) -> Result<(), Error<E>> {
    self.modify_ram(location, |v| v | mask(bit))
  }

  pub fn clear_bit(&mut self, location: impl Into<u8>, bit: u8) -> Result<(), Error<E>> {
    self.modify_ram(location, |v| v & !mask(bit))
  }

  /// Flip one bit with a single XOR command.
  pub fn toggle_bit(&mut self, location: impl Into<u8>, bit: u8) -> Result<(), Error<E>> {
    self.xor_ram(location, mask(bit))
  }

  /// Typed view of the `CONFIG` register.
  pub fn config_flags(&mut self) -> Result<ConfigFlags, Error<E>> {
    self.read_ram(Reg::Config).map(ConfigFlags::from_bits)
  }

  /// Read-modify-write of the `CONFIG` register.
  pub fn modify_config_flags<F: FnOnce(&mut ConfigFlags)>(&mut self, f: F) -> Result<(), Error<E>> {
    let mut flags = self.config_flags()?;
    f(&mut flags);
    self.write_ram(Reg::Config, flags.into_bits())
  }

  fn modify_ram<F: FnOnce(u8) -> u8>(&mut self, location: impl Into<u8>, f: F) -> Result<(), Error<E>> {
    let location = location.into();
    let value = self.read_ram(location)?;
    self.write_ram(location, f(value))
  }
}

const fn mask(bit: u8) -> u8 {
  1 << (bit & 7)
}

#[cfg(test)]
mod tests {
  use crate::defs::*;
  use crate::mock::{ready, store, FakeTrackPoint, NoopDelay, Scripted};
  use crate::ps2::{Ps2Error, RECEIVE_STEP};
  use crate::reg::{config, Reg};
  use crate::{Config, Error, ResetKind, Snapshot, TrackPoint};

  #[test]
  fn resend_once_then_ack_succeeds() {
    let mut tp = ready();
    tp.ps2.script(Scripted::Ack(RESEND));

    tp.command(&[SET_REMOTE_MODE]).expect("command");
    assert_eq!(tp.ps2.sent.as_slice(), &[SET_REMOTE_MODE, SET_REMOTE_MODE]);
  }

  #[test]
  fn resend_twice_fails() {
    let mut tp = ready();
    tp.ps2.script(Scripted::Ack(RESEND));
    tp.ps2.script(Scripted::Ack(RESEND));

    assert_eq!(tp.command(&[SET_REMOTE_MODE]), Err(Error::Fail));
    assert_eq!(tp.ps2.sends, 2);
  }

  #[test]
  fn error_ack_aborts_remaining_bytes() {
    let mut tp = ready();
    tp.ps2.script(Scripted::Ack(ERROR));

    assert_eq!(tp.command(&[EXT, RAM_WRITE, 0x4A, 0x10]), Err(Error::BadResponse));
    assert_eq!(tp.ps2.sends, 1);
  }

  #[test]
  fn unknown_ack_is_a_protocol_violation() {
    let mut tp = ready();
    tp.ps2.script(Scripted::Ack(0x00));
    assert_eq!(tp.command(&[ENABLE]), Err(Error::Fail));
  }

  #[test]
  fn transport_failure_is_propagated() {
    let mut tp = ready();
    tp.ps2.script(Scripted::Fail);
    assert_eq!(tp.command(&[ENABLE]), Err(Error::Transport(Ps2Error::Timeout(1))));
  }

  #[test]
  fn read_uses_near_form_up_to_0x3f() {
    let mut tp = ready();
    tp.ps2.ram[0x3F] = 0x55;
    tp.ps2.ram[0x40] = 0x66;

    assert_eq!(tp.read_ram(0x3F).expect("near"), 0x55);
    assert_eq!(tp.ps2.sent.as_slice(), &[EXT, 0x3F]);

    tp.ps2.clear_log();
    assert_eq!(tp.read_ram(Reg::Cpt).expect("far"), 0x66);
    assert_eq!(tp.ps2.sent.as_slice(), &[EXT, RAM_READ_FAR, 0x40]);
  }

  #[test]
  fn write_sends_location_and_value() {
    let mut tp = ready();
    tp.write_ram(Reg::Inertia, 0x09).expect("write");
    assert_eq!(tp.ps2.sent.as_slice(), &[EXT, RAM_WRITE, 0x4D, 0x09]);
    assert_eq!(tp.ps2.ram[0x4D], 0x09);
  }

  #[test]
  fn receive_clears_stale_bytes() {
    let mut tp = ready();
    tp.command(&[STATUS_REQUEST]).expect("status");
    tp.receive(3).expect("status bytes");
    assert_eq!(tp.response(), &[0x20, 0x02, 0x64, 0x00]);

    tp.read_ram(Reg::Config).expect("read");
    assert_eq!(tp.response()[1..], [0, 0, 0]);
  }

  #[test]
  fn receive_rejects_requests_beyond_the_buffer() {
    let mut tp = ready();
    tp.ps2.movement = [1, 2, 3];
    tp.command(&[READ_DATA]).expect("read data");

    assert_eq!(tp.receive(RESPONSE_LEN + 1), Err(Error::Fail));
    assert_eq!(tp.ps2.receives, 0);
    assert_eq!(tp.receive(3), Ok(&[1, 2, 3][..]));
  }

  #[test]
  fn receive_stops_at_first_error() {
    let mut tp = ready();
    assert_eq!(tp.receive(2), Err(Error::Transport(Ps2Error::Timeout(RECEIVE_STEP))));
    assert_eq!(tp.ps2.receives, 1);
  }

  #[test]
  fn bit_operations_read_modify_write() {
    let mut tp = ready();
    tp.ps2.ram[Reg::Reg2D as usize] = 0b0000_0010;

    tp.set_bit(Reg::Reg2D, 6).expect("set");
    assert_eq!(tp.ps2.ram[Reg::Reg2D as usize], 0b0100_0010);
    assert!(tp.get_bit(Reg::Reg2D, 6).expect("get"));

    tp.clear_bit(Reg::Reg2D, 1).expect("clear");
    assert_eq!(tp.ps2.ram[Reg::Reg2D as usize], 0b0100_0000);
    assert!(!tp.get_bit(Reg::Reg2D, 1).expect("get"));
  }

  #[test]
  fn toggle_is_a_single_xor() {
    let mut tp = ready();
    let before = tp.ps2.ram[Reg::Config as usize];

    tp.toggle_bit(Reg::Config, config::FLIPX).expect("toggle");

    assert_eq!(tp.ps2.sent.as_slice(), &[EXT, RAM_XOR, 0x2C, 1 << config::FLIPX]);
    assert_eq!(tp.ps2.xors, 1);
    assert_eq!(tp.ps2.writes, 0);
    assert_eq!(tp.ps2.receives, 0);
    assert_eq!(tp.ps2.ram[Reg::Config as usize], before ^ (1 << config::FLIPX));
  }

  #[test]
  fn config_flags_round_trip() {
    let mut tp = ready();
    tp.modify_config_flags(|f| f.set_swap_xy(true)).expect("modify");
    let flags = tp.config_flags().expect("read");
    assert!(flags.swap_xy());
    assert!(flags.press_to_select());
  }

  #[test]
  fn disabled_session_never_touches_the_wire() {
    let mut tp = TrackPoint::new(FakeTrackPoint::new(Config::default().table), NoopDelay::new(), Config::default());

    assert_eq!(tp.command(&[ENABLE]), Err(Error::Disabled));
    assert_eq!(tp.receive(1), Err(Error::Disabled));
    assert_eq!(tp.read_ram(Reg::Snstvty), Err(Error::Disabled));
    assert_eq!(tp.write_ram(Reg::Snstvty, 1), Err(Error::Disabled));
    assert_eq!(tp.set_bit(Reg::Config, 0), Err(Error::Disabled));
    assert_eq!(tp.clear_bit(Reg::Config, 0), Err(Error::Disabled));
    assert_eq!(tp.get_bit(Reg::Config, 0), Err(Error::Disabled));
    assert_eq!(tp.toggle_bit(Reg::Config, 0), Err(Error::Disabled));
    assert_eq!(tp.extract_config().map(|_| ()), Err(Error::Disabled));
    assert_eq!(tp.read_movement().map(|_| ()), Err(Error::Disabled));
    assert_eq!(tp.read_extended_id().map(|_| ()), Err(Error::Disabled));
    assert_eq!(tp.enable_reporting(), Err(Error::Disabled));
    assert_eq!(tp.reset(ResetKind::Hard), Err(Error::Disabled));
    assert_eq!(tp.reset(ResetKind::Soft), Err(Error::Disabled));
    assert_eq!(tp.read_post_results().map(|_| ()), Err(Error::Disabled));
    assert_eq!(tp.apply_config(&Snapshot::new(64, 3, 3)), Err(Error::Disabled));
    assert_eq!(tp.save(&mut store()), Err(Error::Disabled));
    assert_eq!(tp.set_precision_mode(true), Err(Error::Disabled));
    assert_eq!(tp.config_flags().map(|_| ()), Err(Error::Disabled));
    assert_eq!(tp.modify_config_flags(|f| f.set_flip_x(true)), Err(Error::Disabled));
    assert_eq!(tp.status_request().map(|_| ()), Err(Error::Disabled));
    assert_eq!(tp.ps2.transport_calls(), 0);
    assert_eq!(tp.delay.total_ns(), 0);
  }

  #[test]
  fn disable_stops_further_io() {
    let mut tp = ready();
    tp.disable();
    assert_eq!(tp.read_ram(Reg::Snstvty), Err(Error::Disabled));
    assert_eq!(tp.ps2.transport_calls(), 0);
  }
}
