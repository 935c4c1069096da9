use embedded_hal::delay::DelayNs;

use crate::defs::*;
use crate::ps2::Ps2Transport;
use crate::reg::{config, PostResult, Reg};
use crate::settings::{SettingKind, SettingsStore};
use crate::snapshot::Snapshot;
use crate::{Error, TrackPoint};

/// Strength of a device reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetKind {
  /// Power-on reset (`E2 7F`). Restores every RAM location.
  Hard,
  /// Standard PS/2 reset (`FF`). Medium and hard settings survive.
  Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum InitState {
  Reset,
  RemoteMode,
  LoadSettings,
  ApplySnapshot,
  WriteDefaults,
  Save,
}

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  /// Bring the device up.
  ///
  /// Resets it (power-on reset the first time, soft reset afterwards), switches
  /// to remote mode and restores the snapshot kept in `store`. Without a stored
  /// snapshot the first-run settings from [`crate::Config`] are written and
  /// saved. On failure the session is left disabled.
  pub fn init<S: SettingsStore>(&mut self, store: &mut S) -> Result<(), Error<E>> {
    self.initialized = true;
    let result = self.bring_up(store);
    if result.is_err() {
      self.initialized = false;
    }
    result
  }

  fn bring_up<S: SettingsStore>(&mut self, store: &mut S) -> Result<(), Error<E>> {
    self.response = [0; RESPONSE_LEN];
    let mut state = InitState::Reset;
    let mut snapshot = None;

    loop {
      match state {
        InitState::Reset => {
          let kind = if self.booted { ResetKind::Soft } else { ResetKind::Hard };
          self.reset(kind)?;
          self.booted = true;
          state = InitState::RemoteMode;
        }

        InitState::RemoteMode => {
          self.set_remote_mode()?;
          state = InitState::LoadSettings;
        }

        InitState::LoadSettings => {
          snapshot = load_snapshot(store);
          state = if snapshot.is_some() { InitState::ApplySnapshot } else { InitState::WriteDefaults };
        }

        InitState::ApplySnapshot => {
          if let Some(snapshot) = snapshot.as_ref() {
            self.apply_config(snapshot)?;
          }
          info!("trackpoint: configuration restored");
          return Ok(());
        }

        InitState::WriteDefaults => {
          let sensitivity = self.normal_sensitivity;
          self.write_ram(Reg::Snstvty, sensitivity)?;
          self.sensitivity = sensitivity;
          self.write_ram(Reg::Value6, self.config.plateau)?;
          if self.config.press_to_select {
            self.set_bit(Reg::Config, config::PTSON)?;
          }
          state = InitState::Save;
        }

        InitState::Save => {
          self.save(store)?;
          info!("trackpoint: first-run configuration saved");
          return Ok(());
        }
      }
    }
  }

  /// Reset the device and check its self-test completion code.
  ///
  /// A failed self-test reads the POST result register for the log and returns
  /// [`Error::PostFail`] with the code the device sent.
  pub fn reset(&mut self, kind: ResetKind) -> Result<(), Error<E>> {
    match kind {
      ResetKind::Hard => {
        self.command(&[EXT, POWER_ON_RESET])?;
        self.delay.delay_ms(self.config.hard_reset_ms);
      }
      ResetKind::Soft => {
        self.command(&[RESET])?;
        self.delay.delay_ms(self.config.soft_reset_ms);
      }
    }
    self.receive(2)?;

    match self.response[0] {
      POST_PASSED => {
        debug!("reset complete, device id {=u8:#x}", self.response[1]);
        Ok(())
      }
      POST_FAILED => {
        if let Ok(post) = self.read_post_results() {
          error!("self-test failed, POST {=u8:#x}", post.into_bits());
        }
        Err(Error::PostFail(POST_FAILED))
      }
      code => {
        error!("unknown completion code {=u8:#x} {=u8:#x}", code, self.response[1]);
        Err(Error::PostFail(code))
      }
    }
  }

  /// Read the power-on self-test result register.
  pub fn read_post_results(&mut self) -> Result<PostResult, Error<E>> {
    self.command(&[EXT, READ_POST_RESULTS])?;
    self.receive(1).map(|r| PostResult::from_bits(r[0]))
  }

  /// Persist the current configuration snapshot.
  pub fn save<S: SettingsStore>(&mut self, store: &mut S) -> Result<(), Error<E>> {
    let snapshot = self.extract_config()?;
    if store.save(SettingKind::TrackPoint, &snapshot.to_bytes()) {
      Ok(())
    } else {
      error!("trackpoint: saving settings failed");
      Err(Error::Storage)
    }
  }
}

fn load_snapshot<S: SettingsStore>(store: &mut S) -> Option<Snapshot> {
  let mut buf = [0u8; Snapshot::BYTES];
  let len = store.load(SettingKind::TrackPoint, &mut buf)?;
  let snapshot = Snapshot::from_bytes(&buf[..len]);
  if snapshot.is_none() {
    warn!("trackpoint: stored settings rejected");
  }
  snapshot
}
