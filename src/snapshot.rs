use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::init::ResetKind;
use crate::ps2::Ps2Transport;
use crate::reg::Reg;
use crate::table::{RamEntry, MAX_CONFIG_LOCATIONS};
use crate::{Error, TrackPoint};

/// The configuration that differs from the documented defaults.
///
/// Holds at most one entry per medium-persistence location, each value already
/// masked to its configurable bits, plus the driver-side settings that do not
/// live in device RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
  items: Vec<RamEntry, MAX_CONFIG_LOCATIONS>,
  pub precision_sensitivity: u8,
  pub scroll_divisor_h: u8,
  pub scroll_divisor_v: u8,
}

impl Snapshot {
  /// Size of the persisted form: count, location/value pairs, three scalars.
  pub const BYTES: usize = 1 + 2 * MAX_CONFIG_LOCATIONS + 3;

  pub const fn new(precision_sensitivity: u8, scroll_divisor_h: u8, scroll_divisor_v: u8) -> Self {
    Self { items: Vec::new(), precision_sensitivity, scroll_divisor_h, scroll_divisor_v }
  }

  pub fn items(&self) -> &[RamEntry] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&self, location: impl Into<u8>) -> Option<u8> {
    let location = location.into();
    self.items.iter().find(|e| e.location == location).map(|e| e.value)
  }

  /// Add or replace the value for `location`. Returns `false` when the
  /// snapshot is full.
  pub fn insert(&mut self, location: impl Into<u8>, value: u8) -> bool {
    let location = location.into();
    if let Some(entry) = self.items.iter_mut().find(|e| e.location == location) {
      entry.value = value;
      return true;
    }
    self.items.push(RamEntry { location, value }).is_ok()
  }

  pub fn to_bytes(&self) -> [u8; Self::BYTES] {
    let mut buf = [0u8; Self::BYTES];
    buf[0] = self.items.len() as u8;
    for (i, entry) in self.items.iter().enumerate() {
      buf[1 + 2 * i] = entry.location;
      buf[2 + 2 * i] = entry.value;
    }
    let tail = 1 + 2 * MAX_CONFIG_LOCATIONS;
    buf[tail] = self.precision_sensitivity;
    buf[tail + 1] = self.scroll_divisor_h;
    buf[tail + 2] = self.scroll_divisor_v;
    buf
  }

  /// Decode the persisted form. Rejects short input, counts above capacity
  /// and repeated locations.
  pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
    if bytes.len() < Self::BYTES {
      return None;
    }
    let count = bytes[0] as usize;
    if count > MAX_CONFIG_LOCATIONS {
      return None;
    }

    let tail = 1 + 2 * MAX_CONFIG_LOCATIONS;
    let mut snapshot = Self::new(bytes[tail], bytes[tail + 1], bytes[tail + 2]);
    for pair in bytes[1..1 + 2 * count].chunks_exact(2) {
      if snapshot.get(pair[0]).is_some() {
        return None;
      }
      snapshot.items.push(RamEntry { location: pair[0], value: pair[1] }).ok()?;
    }
    Some(snapshot)
  }
}

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  /// Read every medium-persistence location and keep the ones whose
  /// configurable bits differ from the documented default.
  pub fn extract_config(&mut self) -> Result<Snapshot, Error<E>> {
    self.ensure_enabled()?;
    let table = self.config.table;
    let mut snapshot = Snapshot::new(self.precision_sensitivity, self.scroll_divisor_h, self.scroll_divisor_v);

    for entry in table.medium {
      let default = table.default_value(entry.location).ok_or(Error::NotFound(entry.location))? & entry.value;
      let value = self.read_ram(entry.location)? & entry.value;
      if value != default {
        trace!("config {=u8:#x} = {=u8:#x}", entry.location, value);
        if !snapshot.insert(entry.location, value) {
          return Err(Error::Fail);
        }
      }
    }
    Ok(snapshot)
  }

  /// Power-on reset the device, then write back the configurable bits held in
  /// `snapshot`.
  ///
  /// Bits outside a location's configurable mask keep whatever the device
  /// holds after the reset. Locations already written stay written if a later
  /// step fails.
  pub fn apply_config(&mut self, snapshot: &Snapshot) -> Result<(), Error<E>> {
    self.reset(ResetKind::Hard)?;
    let table = self.config.table;

    for item in snapshot.items() {
      let mask = table.medium_mask(item.location).ok_or(Error::NotFound(item.location))?;
      let current = self.read_ram(item.location)?;
      let requested = item.value & mask;

      if current & mask != requested {
        let value = (current & !mask) | requested | table.forced_bits(item.location);
        debug!("apply {=u8:#x}: {=u8:#x} -> {=u8:#x}", item.location, current, value);
        self.write_ram(item.location, value)?;
      }
    }

    let sensitivity = self.read_ram(Reg::Snstvty)?;
    self.sensitivity = sensitivity;
    self.normal_sensitivity = sensitivity;

    self.precision_sensitivity = snapshot.precision_sensitivity;
    self.scroll_divisor_h = snapshot.scroll_divisor_h;
    self.scroll_divisor_v = snapshot.scroll_divisor_v;
    Ok(())
  }
}
