//! Polling example: movement packets turned into mouse reports.
#![allow(unused)]
use embedded_hal::delay::DelayNs;
use trackpoint::{ps2::Ps2Transport, Config, MouseReport, SettingsStore, TrackPoint};

#[allow(dead_code)]
fn run<P, D, S, F>(ps2: P, delay: D, store: &mut S, mut send: F) -> Result<(), trackpoint::Error<P::Error>>
where
  P: Ps2Transport,
  D: DelayNs,
  S: SettingsStore,
  F: FnMut(&MouseReport),
{
  let config = Config::default().with_scroll_divisors(2, 4);
  let mut tp = TrackPoint::new(ps2, delay, config);
  tp.init(store)?;

  let mut pointer = tp.pointer();
  loop {
    let movement = tp.read_movement()?;
    for report in pointer.update(&movement).iter() {
      send(report);
    }
  }
}

fn main() {}
