//! Simulated TrackPoint and helpers for unit tests.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};

use crate::defs::*;
use crate::ps2::{Ps2Error, Ps2Transport, RECEIVE_STEP};
use crate::reg::{reg28, reg2d, Reg};
use crate::table::RegisterTable;
use crate::{Config, EepromSettings, MemoryEeprom, TrackPoint};

pub(crate) const ROM_VERSION: u8 = 0x0E;
pub(crate) const SECONDARY_ID: [u8; 2] = [0x01, 0x0E];
pub(crate) const STATUS: [u8; 3] = [0x20, 0x02, 0x64];

/// Answer to the next byte the host sends, instead of the normal ACK.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scripted {
  Ack(u8),
  Fail,
}

/// A TrackPoint that lives in memory.
///
/// Command bytes are decoded as they arrive and answered from 256 bytes of RAM
/// seeded with the documented defaults.
pub(crate) struct FakeTrackPoint {
  pub ram: [u8; 256],
  defaults: [u8; 256],
  pub sent: Vec<u8, 2048>,
  pub sends: usize,
  pub receives: usize,
  pub writes: usize,
  pub xors: usize,
  pub hard_resets: usize,
  pub soft_resets: usize,
  pub post_code: u8,
  pub movement: [u8; 3],
  pub extended_id: &'static [u8],
  /// Fail the n-th transmitted byte (1-based) with a timeout.
  pub fail_at: Option<usize>,
  script: Deque<Scripted, 8>,
  command: Vec<u8, 4>,
  pending: Deque<u8, 512>,
}

impl FakeTrackPoint {
  pub fn new(table: &RegisterTable) -> Self {
    let mut defaults = [0u8; 256];
    for entry in table.defaults {
      defaults[entry.location as usize] = entry.value;
    }
    defaults[Reg::Curstat as usize] = 1 << crate::reg::curstat::ALWAYS_ONE;

    Self {
      ram: defaults,
      defaults,
      sent: Vec::new(),
      sends: 0,
      receives: 0,
      writes: 0,
      xors: 0,
      hard_resets: 0,
      soft_resets: 0,
      post_code: POST_PASSED,
      movement: [0x08, 0, 0],
      extended_id: b"",
      fail_at: None,
      script: Deque::new(),
      command: Vec::new(),
      pending: Deque::new(),
    }
  }

  pub fn script(&mut self, answer: Scripted) {
    let _ = self.script.push_back(answer);
  }

  pub fn transport_calls(&self) -> usize {
    self.sends + self.receives
  }

  pub fn clear_log(&mut self) {
    self.sent.clear();
    self.sends = 0;
    self.receives = 0;
    self.writes = 0;
    self.xors = 0;
    self.hard_resets = 0;
    self.soft_resets = 0;
  }

  fn queue(&mut self, bytes: &[u8]) {
    for &b in bytes {
      let _ = self.pending.push_back(b);
    }
  }

  fn decode(&mut self) {
    let mut done = true;
    let command = self.command.clone();

    match command.as_slice() {
      [RESET] => {
        self.soft_resets += 1;
        self.ram[Reg::Reg28 as usize] &= !(1 << reg28::KBURST);
        self.ram[Reg::Reg2D as usize] &= !(1 << reg2d::NOSYNC);
        self.queue(&[self.post_code, 0x00]);
      }
      [READ_DATA] => {
        let movement = self.movement;
        self.queue(&movement);
      }
      [READ_EXTENDED_ID] => self.queue(self.extended_id),
      [READ_SECONDARY_ID] => self.queue(&SECONDARY_ID),
      [READ_DEVICE_TYPE] => self.queue(&[0x00]),
      [STATUS_REQUEST] => self.queue(&STATUS),
      [SET_RESOLUTION] | [SET_SAMPLING_RATE] | [EXT] => done = false,
      [EXT, POWER_ON_RESET] => {
        self.hard_resets += 1;
        self.ram = self.defaults;
        self.queue(&[self.post_code, 0x00]);
      }
      [EXT, READ_ROM_VERSION] => self.queue(&[ROM_VERSION]),
      [EXT, RAM_READ_FAR] | [EXT, RAM_WRITE] | [EXT, RAM_XOR] | [EXT, RAM_WRITE, _] | [EXT, RAM_XOR, _] => done = false,
      [EXT, location] if *location <= Reg::Plast as u8 => {
        let value = self.ram[*location as usize];
        self.queue(&[value]);
      }
      [EXT, RAM_READ_FAR, location] => {
        let value = self.ram[*location as usize];
        self.queue(&[value]);
      }
      [EXT, RAM_WRITE, location, value] => {
        self.writes += 1;
        self.ram[*location as usize] = *value;
      }
      [EXT, RAM_XOR, location, mask] => {
        self.xors += 1;
        self.ram[*location as usize] ^= *mask;
      }
      _ => {}
    }

    if done {
      self.command.clear();
    }
  }
}

impl Ps2Transport for FakeTrackPoint {
  type Error = Ps2Error;

  fn send(&mut self, byte: u8) -> Result<u8, Ps2Error> {
    self.sends += 1;
    let _ = self.sent.push(byte);

    if self.fail_at == Some(self.sends) {
      return Err(Ps2Error::Timeout(1));
    }

    match self.script.pop_front() {
      Some(Scripted::Ack(code)) => return Ok(code),
      Some(Scripted::Fail) => return Err(Ps2Error::Timeout(1)),
      None => {}
    }

    if self.command.push(byte).is_err() {
      self.command.clear();
    }
    self.decode();
    Ok(ACK)
  }

  fn receive(&mut self) -> Result<u8, Ps2Error> {
    self.receives += 1;
    self.pending.pop_front().ok_or(Ps2Error::Timeout(RECEIVE_STEP))
  }
}

/// Delay that returns at once and remembers how long it was asked to wait.
#[derive(Debug, Default)]
pub(crate) struct NoopDelay {
  total: Cell<u64>,
}

impl NoopDelay {
  pub fn new() -> Self {
    Self { total: Cell::new(0) }
  }

  pub fn total_ns(&self) -> u64 {
    self.total.get()
  }

  pub fn total_ms(&self) -> u64 {
    self.total.get() / 1_000_000
  }
}

impl DelayNs for NoopDelay {
  fn delay_ns(&mut self, ns: u32) {
    self.total.set(self.total.get() + ns as u64);
  }
}

impl DelayNs for &NoopDelay {
  fn delay_ns(&mut self, ns: u32) {
    self.total.set(self.total.get() + ns as u64);
  }
}

pub(crate) type FakeSession = TrackPoint<FakeTrackPoint, NoopDelay>;
pub(crate) type FakeStore = EepromSettings<MemoryEeprom<256>>;

pub(crate) fn store() -> FakeStore {
  EepromSettings::new(MemoryEeprom::new())
}

/// A session brought up against a blank settings store, with the device log cleared.
pub(crate) fn ready() -> FakeSession {
  ready_with(Config::default())
}

pub(crate) fn ready_with(config: Config) -> FakeSession {
  let mut tp = TrackPoint::new(FakeTrackPoint::new(config.table), NoopDelay::new(), config);
  let mut store = store();
  if tp.init(&mut store).is_err() {
    panic!("fake device failed to initialize");
  }
  tp.ps2.clear_log();
  tp
}
