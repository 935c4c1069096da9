//! Bring-up example: reset, remote mode and stored configuration.
#![allow(unused)]
use embedded_hal::{
  delay::DelayNs,
  digital::{InputPin, OutputPin},
};
use trackpoint::{
  ps2::{Ps2Host, Ps2Link},
  Config, EepromSettings, MemoryEeprom, TrackPoint, Variant, EEPROM_FOOTPRINT,
};

#[allow(dead_code)]
fn run<CLK, DAT, D>(clk: CLK, dat: DAT, delay: D, host_delay: D) -> Result<(), trackpoint::Error<trackpoint::Ps2Error>>
where
  CLK: InputPin + OutputPin,
  DAT: InputPin + OutputPin,
  D: DelayNs,
{
  // The receiver half belongs in the clock-line interrupt handler.
  let mut link: Ps2Link<16> = Ps2Link::new();
  let (_receiver, rx) = link.split();

  let ps2 = Ps2Host::new(clk, dat, host_delay, rx).with_receive_timeout(200);
  let config = Config::default().with_variant(Variant::Mx13Ss).with_plateau(140);
  let mut tp = TrackPoint::new(ps2, delay, config);

  let mut store = EepromSettings::new(MemoryEeprom::<EEPROM_FOOTPRINT>::new());
  tp.init(&mut store)?;

  let _rom = tp.read_rom_version()?;
  let _post = tp.read_post_results()?;
  let _id = tp.read_extended_id()?;
  Ok(())
}

fn main() {}
