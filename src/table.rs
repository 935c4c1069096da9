//! Static catalog of configurable TrackPoint RAM locations.
//!
//! Each entry pairs a location with a byte. For the persistence lists the byte
//! is the mask of bits belonging to that class; for the defaults list it is the
//! documented power-on value. All lists are sorted by ascending address so
//! lookups can binary search.

use crate::reg::{config, curstat, reg20, reg21, reg22, reg23, reg28, reg2d, reg2e, Reg};

/// How long a configured value survives device resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Persistence {
  /// Only a power-on reset restores the default.
  Hard,
  /// Survives soft resets and the set-defaults command.
  Medium,
  /// Reverts on any reset or set-defaults command.
  Soft,
  /// Not a configurable setting, or undocumented.
  Unconfigurable,
}

/// One `(location, byte)` table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RamEntry {
  pub location: u8,
  pub value: u8,
}

impl RamEntry {
  pub const fn new(location: Reg, value: u8) -> Self {
    Self { location: location as u8, value }
  }
}

/// Number of medium-class locations, and therefore the snapshot capacity.
pub const MAX_CONFIG_LOCATIONS: usize = 28;

const fn bit(n: u8) -> u8 {
  1 << n
}

const HARD_SETS: [RamEntry; 1] = [RamEntry::new(Reg::Config, bit(config::FTRANS))];

const MEDIUM_SETS: [RamEntry; MAX_CONFIG_LOCATIONS] = [
  RamEntry::new(Reg::Reg20, bit(reg20::SAMDIS) | bit(reg20::TAGBIT)),
  RamEntry::new(Reg::Reg22, bit(reg22::FORCEB3)),
  RamEntry::new(
    Reg::Reg23,
    bit(reg23::BLOCK3) | bit(reg23::MCOMDIS) | bit(reg23::SKIPPOTS) | bit(reg23::SETPOTS) | bit(reg23::SKIPDRIFT),
  ),
  RamEntry::new(
    Reg::Config,
    bit(config::PTSON)
      | bit(config::HALFTAC)
      | bit(config::BUTTON2)
      | bit(config::FLIPX)
      | bit(config::FLIPY)
      | bit(config::FLIPZ)
      | bit(config::SWAPXY),
  ),
  RamEntry::new(
    Reg::Reg2D,
    bit(reg2d::NMBBIT) | bit(reg2d::STICKY2) | bit(reg2d::SKIPBACK) | bit(reg2d::REMMOUENB) | bit(reg2d::SKIPZSTEP) | bit(reg2d::MSFIX),
  ),
  RamEntry::new(Reg::Reg2E, bit(reg2e::SKIPTAC) | bit(reg2e::STOPF4)),
  // DELAYL/DELAYH, DELAYHZ, DRIFT, XYDRIFTAVG and XYAVGTHR vary between parts and stay out.
  RamEntry::new(Reg::XyavgFactor, 0xFF),
  RamEntry::new(Reg::Opadelay, 0xFF),
  RamEntry::new(Reg::Dacdelay, 0xFF),
  RamEntry::new(Reg::Gapdelay, 0xFF),
  RamEntry::new(Reg::Snstvty, 0xFF),
  RamEntry::new(Reg::Hpdelay, 0xFF),
  RamEntry::new(Reg::Inertia, 0xFF),
  RamEntry::new(Reg::Pdriftlim, 0xFF),
  RamEntry::new(Reg::PdriftRel, 0xFF),
  RamEntry::new(Reg::Burst1, 0xFF),
  RamEntry::new(Reg::Burst2, 0xFF),
  RamEntry::new(Reg::Burst3, 0xFF),
  RamEntry::new(Reg::Reach, 0xFF),
  RamEntry::new(Reg::Draghys, 0xFF),
  RamEntry::new(Reg::Mindrag, 0xFF),
  RamEntry::new(Reg::Uthr, 0xFF),
  RamEntry::new(Reg::Thr, 0xFF),
  RamEntry::new(Reg::Jkcur, 0xFF),
  RamEntry::new(Reg::Ztc, 0xFF),
  RamEntry::new(Reg::Rstdft1, 0xFF),
  RamEntry::new(Reg::Value6, 0xFF),
  RamEntry::new(Reg::Movdel, 0xFF),
];

const SOFT_SETS: [RamEntry; 2] = [
  RamEntry::new(Reg::Reg28, bit(reg28::KBURST)),
  RamEntry::new(Reg::Reg2D, bit(reg2d::NOSYNC)),
];

const NO_SETS: [RamEntry; 2] = [RamEntry::new(Reg::Reg21, bit(reg21::XDEVIN)), RamEntry::new(Reg::Post, 0xFF)];

/// Bits that must be written as 1 whenever the location is restored.
const FORCED_BITS: [RamEntry; 1] = [RamEntry::new(Reg::Curstat, bit(curstat::ALWAYS_ONE))];

const fn defaults(config_default: u8) -> [RamEntry; 29] {
  [
    // Bitfields
    RamEntry::new(Reg::Reg20, 0x00),
    RamEntry::new(Reg::Reg22, 0x00),
    RamEntry::new(Reg::Reg23, 0x00),
    RamEntry::new(Reg::Reg28, 0x00),
    RamEntry::new(Reg::Config, config_default),
    RamEntry::new(Reg::Reg2D, 0x00),
    RamEntry::new(Reg::Reg2E, 0x00),
    // Bytes
    RamEntry::new(Reg::XyavgFactor, 0x80),
    RamEntry::new(Reg::Opadelay, 0x74),
    RamEntry::new(Reg::Dacdelay, 0xC8),
    RamEntry::new(Reg::Gapdelay, 0xC8),
    RamEntry::new(Reg::Snstvty, 0x80),
    RamEntry::new(Reg::Hpdelay, 0x32),
    RamEntry::new(Reg::Inertia, 0x06),
    RamEntry::new(Reg::Pdriftlim, 0x03),
    RamEntry::new(Reg::PdriftRel, 0x64),
    RamEntry::new(Reg::Burst1, 0x3F),
    RamEntry::new(Reg::Burst2, 0x3D),
    RamEntry::new(Reg::Burst3, 0x3E),
    RamEntry::new(Reg::Reach, 0x0A),
    RamEntry::new(Reg::Draghys, 0xFF),
    RamEntry::new(Reg::Mindrag, 0x14),
    RamEntry::new(Reg::Uthr, 0xFF),
    RamEntry::new(Reg::Thr, 0x08),
    RamEntry::new(Reg::Jkcur, 0x87),
    RamEntry::new(Reg::Ztc, 0x26),
    // Documented as 0x05, shipping parts report 0x1B.
    RamEntry::new(Reg::Rstdft1, 0x1B),
    RamEntry::new(Reg::Value6, 0x61),
    RamEntry::new(Reg::Movdel, 0x26),
  ]
}

const THREE_BUTTON_DEFAULTS: [RamEntry; 29] = defaults(0x00);
const TWO_BUTTON_DEFAULTS: [RamEntry; 29] = defaults(bit(config::BUTTON2));

/// Persistence classes and documented defaults for one kind of TrackPoint.
#[derive(Debug)]
pub struct RegisterTable {
  pub hard: &'static [RamEntry],
  pub medium: &'static [RamEntry],
  pub soft: &'static [RamEntry],
  pub unconfigurable: &'static [RamEntry],
  pub defaults: &'static [RamEntry],
  pub forced: &'static [RamEntry],
}

impl RegisterTable {
  pub const THREE_BUTTON: RegisterTable = RegisterTable {
    hard: &HARD_SETS,
    medium: &MEDIUM_SETS,
    soft: &SOFT_SETS,
    unconfigurable: &NO_SETS,
    defaults: &THREE_BUTTON_DEFAULTS,
    forced: &FORCED_BITS,
  };

  pub const TWO_BUTTON: RegisterTable = RegisterTable {
    hard: &HARD_SETS,
    medium: &MEDIUM_SETS,
    soft: &SOFT_SETS,
    unconfigurable: &NO_SETS,
    defaults: &TWO_BUTTON_DEFAULTS,
    forced: &FORCED_BITS,
  };

  /// Configurable-bit mask of a medium-class location.
  pub fn medium_mask(&self, location: u8) -> Option<u8> {
    lookup(self.medium, location)
  }

  /// Documented default value of a location.
  pub fn default_value(&self, location: u8) -> Option<u8> {
    lookup(self.defaults, location)
  }

  /// Bits that must be set whenever the location is written back.
  pub fn forced_bits(&self, location: u8) -> u8 {
    lookup(self.forced, location).unwrap_or(0)
  }

  /// Persistence class of one bit of a location, `None` if the table does not
  /// mention it.
  pub fn class_of(&self, location: u8, bit: u8) -> Option<Persistence> {
    let classes = [
      (self.hard, Persistence::Hard),
      (self.medium, Persistence::Medium),
      (self.soft, Persistence::Soft),
      (self.unconfigurable, Persistence::Unconfigurable),
    ];
    classes
      .into_iter()
      .find(|(list, _)| lookup(list, location).is_some_and(|mask| mask & (1 << (bit & 7)) != 0))
      .map(|(_, class)| class)
  }
}

/// Key lookup over an address-sorted table.
pub(crate) fn lookup(list: &[RamEntry], location: u8) -> Option<u8> {
  list.binary_search_by_key(&location, |e| e.location).ok().map(|i| list[i].value)
}

/// Hardware variants of the keyboard. All of them carry a three-button TrackPoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
  #[default]
  Mx13,
  Mx13Ss,
  Ssmx,
}

impl Variant {
  pub const fn table(self) -> &'static RegisterTable {
    match self {
      Variant::Mx13 | Variant::Mx13Ss | Variant::Ssmx => &RegisterTable::THREE_BUTTON,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sorted(list: &[RamEntry]) -> bool {
    list.windows(2).all(|w| w[0].location < w[1].location)
  }

  #[test]
  fn tables_are_sorted_without_duplicates() {
    for table in [&RegisterTable::THREE_BUTTON, &RegisterTable::TWO_BUTTON] {
      assert!(sorted(table.hard));
      assert!(sorted(table.medium));
      assert!(sorted(table.soft));
      assert!(sorted(table.unconfigurable));
      assert!(sorted(table.defaults));
      assert!(sorted(table.forced));
    }
  }

  #[test]
  fn every_medium_location_has_a_default() {
    for table in [&RegisterTable::THREE_BUTTON, &RegisterTable::TWO_BUTTON] {
      for entry in table.medium {
        assert!(table.default_value(entry.location).is_some(), "missing default for {:#04x}", entry.location);
      }
    }
  }

  #[test]
  fn medium_table_matches_capacity() {
    assert_eq!(RegisterTable::THREE_BUTTON.medium.len(), MAX_CONFIG_LOCATIONS);
  }

  #[test]
  fn lookup_finds_entries_past_their_address() {
    // MOVDEL sits at index 27 but address 0x61; REG20 at index 0 but address 0x20.
    let table = &RegisterTable::THREE_BUTTON;
    assert_eq!(table.medium_mask(Reg::Movdel as u8), Some(0xFF));
    assert_eq!(table.medium_mask(Reg::Reg20 as u8), Some(0x90));
    assert_eq!(table.medium_mask(Reg::Post as u8), None);
    assert_eq!(table.default_value(Reg::Snstvty as u8), Some(0x80));
  }

  #[test]
  fn button_count_changes_config_default() {
    assert_eq!(RegisterTable::THREE_BUTTON.default_value(Reg::Config as u8), Some(0));
    assert_eq!(RegisterTable::TWO_BUTTON.default_value(Reg::Config as u8), Some(1 << config::BUTTON2));
  }

  #[test]
  fn persistence_classes() {
    let table = Variant::Mx13.table();
    assert_eq!(table.class_of(Reg::Config as u8, config::FTRANS), Some(Persistence::Hard));
    assert_eq!(table.class_of(Reg::Config as u8, config::PTSON), Some(Persistence::Medium));
    assert_eq!(table.class_of(Reg::Reg2D as u8, reg2d::NOSYNC), Some(Persistence::Soft));
    assert_eq!(table.class_of(Reg::Reg2D as u8, reg2d::MSFIX), Some(Persistence::Medium));
    assert_eq!(table.class_of(Reg::Post as u8, 3), Some(Persistence::Unconfigurable));
    assert_eq!(table.class_of(Reg::Xlast as u8, 0), None);
  }

  #[test]
  fn tables_are_usable_in_const_context() {
    const TABLE: &RegisterTable = Variant::Ssmx.table();
    const MEDIUM: &[RamEntry] = RegisterTable::TWO_BUTTON.medium;
    assert_eq!(TABLE.medium, MEDIUM);
    assert_eq!(TABLE.defaults.len(), 29);
  }

  #[test]
  fn curstat_reserved_bit_is_forced() {
    assert_eq!(RegisterTable::THREE_BUTTON.forced_bits(Reg::Curstat as u8), 1 << curstat::ALWAYS_ONE);
    assert_eq!(RegisterTable::THREE_BUTTON.forced_bits(Reg::Config as u8), 0);
  }
}
