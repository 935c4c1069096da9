//! Persistent settings.
//!
//! The driver only needs [`SettingsStore`]. [`EepromSettings`] implements it
//! over any byte-addressable [`Eeprom`] with a small header that describes
//! each settings area:
//!
//! | offset | size | content                                  |
//! |--------|------|------------------------------------------|
//! | 0      | 2    | signifier `0x1313`, little endian        |
//! | 2      | 7    | LED area descriptor                      |
//! | 9      | 7    | TrackPoint area descriptor               |
//! | 16     | 32   | LED area                                 |
//! | 48     | 64   | TrackPoint area                          |
//!
//! A descriptor holds the present flag, the kind, the area offset and the
//! stored size (both `u16` little endian) and an additive checksum of the
//! stored bytes.

/// Settings areas known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SettingKind {
  TrackPoint = 0,
  Leds = 1,
}

impl SettingKind {
  const fn area(self) -> (u16, u16) {
    match self {
      SettingKind::Leds => (LED_AREA, LED_CAPACITY),
      SettingKind::TrackPoint => (TRACKPOINT_AREA, TRACKPOINT_CAPACITY),
    }
  }

  const fn slot(self) -> usize {
    match self {
      SettingKind::Leds => 0,
      SettingKind::TrackPoint => 1,
    }
  }
}

/// Where the driver keeps its configuration between power cycles.
///
/// The store is responsible for integrity: `load` returns `None` for anything
/// it cannot vouch for.
pub trait SettingsStore {
  /// Copy the stored bytes of `kind` into `buf` and return how many there are.
  fn load(&mut self, kind: SettingKind, buf: &mut [u8]) -> Option<usize>;

  /// Replace the stored bytes of `kind`. Returns `false` if nothing was saved.
  fn save(&mut self, kind: SettingKind, bytes: &[u8]) -> bool;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
  fn load(&mut self, kind: SettingKind, buf: &mut [u8]) -> Option<usize> {
    T::load(self, kind, buf)
  }

  fn save(&mut self, kind: SettingKind, bytes: &[u8]) -> bool {
    T::save(self, kind, bytes)
  }
}

/// Byte-addressable non-volatile memory.
pub trait Eeprom {
  type Error;

  fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), Self::Error>;
  fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), Self::Error>;
}

const SIGNIFIER: u16 = 0x1313;

const DESCRIPTOR_LEN: usize = 7;
const HEADER_LEN: usize = 2 + 2 * DESCRIPTOR_LEN;

const LED_AREA: u16 = 16;
const LED_CAPACITY: u16 = 32;
const TRACKPOINT_AREA: u16 = LED_AREA + LED_CAPACITY;
const TRACKPOINT_CAPACITY: u16 = 64;

/// Bytes of EEPROM used by [`EepromSettings`].
pub const EEPROM_FOOTPRINT: usize = (TRACKPOINT_AREA + TRACKPOINT_CAPACITY) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Descriptor {
  present: bool,
  kind: u8,
  offset: u16,
  size: u16,
  checksum: u8,
}

impl Descriptor {
  fn from_bytes(b: &[u8]) -> Self {
    Self {
      present: b[0] != 0,
      kind: b[1],
      offset: u16::from_le_bytes([b[2], b[3]]),
      size: u16::from_le_bytes([b[4], b[5]]),
      checksum: b[6],
    }
  }

  fn write_to(&self, b: &mut [u8]) {
    b[0] = self.present as u8;
    b[1] = self.kind;
    b[2..4].copy_from_slice(&self.offset.to_le_bytes());
    b[4..6].copy_from_slice(&self.size.to_le_bytes());
    b[6] = self.checksum;
  }

  // A present descriptor must point at the fixed area of its own kind.
  fn is_sane(&self, kind: SettingKind) -> bool {
    let (offset, capacity) = kind.area();
    !self.present || (self.kind == kind as u8 && self.offset == offset && self.size <= capacity)
  }
}

fn checksum(bytes: &[u8]) -> u8 {
  bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// [`SettingsStore`] on top of an [`Eeprom`].
///
/// The header is read once and kept in memory. A missing or damaged header is
/// treated as an empty store and rewritten on the next save.
pub struct EepromSettings<M> {
  eeprom: M,
  areas: Option<[Descriptor; 2]>,
}

impl<M: Eeprom> EepromSettings<M> {
  pub fn new(eeprom: M) -> Self {
    Self { eeprom, areas: None }
  }

  pub fn release(self) -> M {
    self.eeprom
  }

  fn areas(&mut self) -> [Descriptor; 2] {
    if let Some(areas) = self.areas {
      return areas;
    }

    let mut header = [0u8; HEADER_LEN];
    let areas = match self.eeprom.read(0, &mut header) {
      Ok(()) => parse_header(&header).unwrap_or_else(|| {
        debug!("settings: no valid header");
        [Descriptor::default(); 2]
      }),
      Err(_) => {
        warn!("settings: header read failed");
        [Descriptor::default(); 2]
      }
    };
    self.areas = Some(areas);
    areas
  }
}

fn parse_header(header: &[u8; HEADER_LEN]) -> Option<[Descriptor; 2]> {
  if u16::from_le_bytes([header[0], header[1]]) != SIGNIFIER {
    return None;
  }
  let leds = Descriptor::from_bytes(&header[2..2 + DESCRIPTOR_LEN]);
  let trackpoint = Descriptor::from_bytes(&header[2 + DESCRIPTOR_LEN..]);
  if leds.is_sane(SettingKind::Leds) && trackpoint.is_sane(SettingKind::TrackPoint) {
    Some([leds, trackpoint])
  } else {
    None
  }
}

impl<M: Eeprom> SettingsStore for EepromSettings<M> {
  fn load(&mut self, kind: SettingKind, buf: &mut [u8]) -> Option<usize> {
    let area = self.areas()[kind.slot()];
    let size = area.size as usize;
    if !area.present || size > buf.len() {
      return None;
    }

    self.eeprom.read(area.offset, &mut buf[..size]).ok()?;
    if checksum(&buf[..size]) != area.checksum {
      warn!("settings: checksum mismatch in area {=u8}", kind as u8);
      return None;
    }
    Some(size)
  }

  fn save(&mut self, kind: SettingKind, bytes: &[u8]) -> bool {
    let (offset, capacity) = kind.area();
    if bytes.len() > capacity as usize {
      return false;
    }

    let mut areas = self.areas();
    areas[kind.slot()] =
      Descriptor { present: true, kind: kind as u8, offset, size: bytes.len() as u16, checksum: checksum(bytes) };

    let mut header = [0u8; HEADER_LEN];
    header[..2].copy_from_slice(&SIGNIFIER.to_le_bytes());
    areas[0].write_to(&mut header[2..2 + DESCRIPTOR_LEN]);
    areas[1].write_to(&mut header[2 + DESCRIPTOR_LEN..]);

    if self.eeprom.write(offset, bytes).is_err() || self.eeprom.write(0, &header).is_err() {
      warn!("settings: write failed");
      // Force a re-read of whatever made it to the EEPROM.
      self.areas = None;
      return false;
    }
    self.areas = Some(areas);
    true
  }
}

/// Access outside the bounds of a [`MemoryEeprom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange;

/// RAM-backed [`Eeprom`], erased to `0xFF`.
#[derive(Debug, Clone)]
pub struct MemoryEeprom<const N: usize> {
  bytes: [u8; N],
}

impl<const N: usize> MemoryEeprom<N> {
  pub const fn new() -> Self {
    Self { bytes: [0xFF; N] }
  }

  pub fn as_bytes(&self) -> &[u8; N] {
    &self.bytes
  }

  pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
    &mut self.bytes
  }

  fn range(offset: u16, len: usize) -> Result<core::ops::Range<usize>, OutOfRange> {
    let start = offset as usize;
    let end = start.checked_add(len).ok_or(OutOfRange)?;
    if end > N {
      Err(OutOfRange)
    } else {
      Ok(start..end)
    }
  }
}

impl<const N: usize> Default for MemoryEeprom<N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> Eeprom for MemoryEeprom<N> {
  type Error = OutOfRange;

  fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), OutOfRange> {
    let range = Self::range(offset, buf.len())?;
    buf.copy_from_slice(&self.bytes[range]);
    Ok(())
  }

  fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), OutOfRange> {
    let range = Self::range(offset, data.len())?;
    self.bytes[range].copy_from_slice(data);
    Ok(())
  }
}
