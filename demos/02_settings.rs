//! Settings example: change registers, persist them and restore after a reset.
#![allow(unused)]
use embedded_hal::delay::DelayNs;
use trackpoint::{ps2::Ps2Transport, reg::config, Config, Reg, ResetKind, SettingsStore, TrackPoint};

#[allow(dead_code)]
fn run<P, D, S>(ps2: P, delay: D, store: &mut S) -> Result<(), trackpoint::Error<P::Error>>
where
  P: Ps2Transport,
  D: DelayNs,
  S: SettingsStore,
{
  let mut tp = TrackPoint::new(ps2, delay, Config::default());
  tp.init(&mut *store)?;

  tp.write_ram(Reg::Snstvty, 0xA0)?;
  tp.modify_config_flags(|f| f.set_press_to_select(false))?;
  tp.set_bit(Reg::Config, config::FLIPY)?;
  tp.save(&mut *store)?;

  // Everything differing from the documented defaults comes back.
  let snapshot = tp.extract_config()?;
  tp.reset(ResetKind::Hard)?;
  tp.apply_config(&snapshot)?;
  Ok(())
}

fn main() {}
