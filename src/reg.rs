/******************************************************************************
 * Refer to the IBM TrackPoint System Version 4.0 Engineering Specification   *
 * (ykt3eext) for more information.                                           *
 * ========================================================================== *
 *                   TrackPoint - RAM Locations & Bitfields                   *
*******************************************************************************/

use bitfield_struct::bitfield;

/// Highest address reachable with the one-byte "read near" command form.
pub(crate) const NEAR_LIMIT: u8 = 0x3F;

/// Named RAM locations inside the TrackPoint controller.
///
/// Locations that share an address under several names are exposed as
/// associated constants (see [`Reg::ANSPRTH`] and friends).
#[allow(dead_code)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
  // Scratch and sampling (0x00..0x1F)
  Reg00 = 0x00,
  Reg01 = 0x01,
  Strcnt = 0x02,
  Samcnt = 0x03,
  Reg04 = 0x04,
  Reg05 = 0x05,
  Reg06 = 0x06,
  Reg07 = 0x07,
  Rate = 0x08,
  Zpt = 0x09,
  Ramsave = 0x0A,
  Bpt = 0x0B,
  Res = 0x0C,
  Ansprtl = 0x0D,
  Nbu = 0x0E,
  Flip = 0x0F,
  Pqtr = 0x10,
  Lxmit1 = 0x11,
  Lxmit2 = 0x12,
  Lxmit3 = 0x13,
  Qtr = 0x14,
  Dftcnt1 = 0x15,
  Mrate = 0x16,
  Xdevtyp = 0x17,
  Xmsb = 0x18,
  Xlsb = 0x19,
  Xpot = 0x1A,
  Ppot = 0x1B,
  Ymsb = 0x1C,
  Ylsb = 0x1D,
  Ypot = 0x1E,
  Lastmag = 0x1F,

  // Status bitfields (0x20..0x2E)
  Reg20 = 0x20,
  Reg21 = 0x21,
  Reg22 = 0x22,
  Reg23 = 0x23,
  Drftcnt2 = 0x24,
  Post = 0x25,
  Moustat = 0x26,
  Curstat = 0x27,
  Reg28 = 0x28,
  Reg29 = 0x29,
  Reg2A = 0x2A,
  Reg2B = 0x2B,
  Config = 0x2C,
  Reg2D = 0x2D,
  Reg2E = 0x2E,

  // Averages, origins and masks (0x2F..0x43)
  Bdown = 0x2F,
  Xravgl = 0x30,
  Xravgh = 0x31,
  Yavgl = 0x32,
  Yavgh = 0x33,
  Pavgl = 0x34,
  Pavgh = 0x35,
  Xorigin = 0x36,
  Yorigin = 0x37,
  Porigin = 0x38,
  Bd = 0x39,
  Lslast = 0x3A,
  Curlast = 0x3B,
  Wthr = 0x3C,
  Xlast = 0x3D,
  Ylast = 0x3E,
  Plast = 0x3F,
  Cpt = 0x40,
  B1mask = 0x41,
  B2mask = 0x42,
  B3mask = 0x43,

  // Tunables (0x44..0x65)
  Delayl = 0x44,
  Delayh = 0x45,
  XyavgFactor = 0x46,
  Opadelay = 0x47,
  Dacdelay = 0x48,
  Gapdelay = 0x49,
  Snstvty = 0x4A,
  Lasts = 0x4B,
  Hpdelay = 0x4C,
  Inertia = 0x4D,
  Pdriftlim = 0x4E,
  PdriftRel = 0x4F,
  Pdriftcnt = 0x50,
  Burst1 = 0x51,
  Burst2 = 0x52,
  Burst3 = 0x53,
  Bdwptr = 0x54,
  Bdrptr = 0x55,
  Dirfac = 0x56,
  Reach = 0x57,
  Draghys = 0x58,
  Mindrag = 0x59,
  Uthr = 0x5A,
  Butrad = 0x5B,
  Thr = 0x5C,
  Jkcur = 0x5D,
  Ztc = 0x5E,
  Rstdft1 = 0x5F,
  Value6 = 0x60,
  Movdel = 0x61,
  Delayhz = 0x62,
  Drift = 0x63,
  Xydriftavg = 0x64,
  Xyavgthr = 0x65,

  // Working storage (0x66..0x85)
  SxyLo = 0x66,
  SxyHi = 0x67,
  Xtemp = 0x68,
  Ytemp = 0x69,
  Samcntrel = 0x6A,
  Xlowl = 0x6B,
  Xlowh = 0x6C,
  Psam = 0x6D,
  Polldel = 0x6E,
  Mxstate = 0x6F,
  Mbyte1 = 0x70,
  Mbyte2 = 0x71,
  Mbyte = 0x72,
  Mbyte3 = 0x73,
  Savebd = 0x74,
  Ylowl = 0x75,
  Ylowh = 0x76,
  Mvdel = 0x77,
  Uwthr = 0x78,
  Unassigned79 = 0x79,
  Bdlast = 0x7A,
  Xlowoff = 0x7B,
  Ylowoff = 0x7C,
  Lowx = 0x7D,
  Lowy = 0x7E,
  Unassigned7F = 0x7F,
  Debug = 0x80,
  Pot0 = 0x81,
  Unassigned82 = 0x82,
  Unassigned83 = 0x83,
  Unassigned84 = 0x84,
  Unassigned85 = 0x85,

  // Block bases (0x86..)
  Bds = 0x86,
  Zf = 0x8A,
  Ls = 0x8F,
  Cur = 0x94,
  Xb = 0xA9,
  Yb = 0xC2,
  Sp = 0xDB,
}

impl Reg {
  pub const ANSPRTH: Reg = Reg::Reg04;
  pub const SAVER1: Reg = Reg::Ramsave;
  pub const TPOT: Reg = Reg::SxyLo;
  pub const ZTEMP: Reg = Reg::SxyLo;
  pub const POTTARGET: Reg = Reg::SxyHi;
  pub const TORIGIN: Reg = Reg::Xtemp;
  pub const MREC_CNTR: Reg = Reg::Mxstate;
  pub const MXBYTE: Reg = Reg::Mbyte;

  /// Raw controller address.
  pub const fn addr(self) -> u8 {
    self as u8
  }

  /// `true` when the location is reachable through the short "read near" form.
  pub const fn is_near(self) -> bool {
    self.addr() <= NEAR_LIMIT
  }
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

/// Bit positions inside `REG20`.
pub mod reg20 {
  pub const MSKIP: u8 = 0;
  pub const MMOVE: u8 = 1;
  pub const INVLD: u8 = 2;
  pub const JOYSKIP: u8 = 3;
  pub const SAMDIS: u8 = 4;
  pub const CAUGHTUP: u8 = 5;
  pub const TAGBIT: u8 = 7;
}

/// Bit positions inside `REG21`.
pub mod reg21 {
  pub const XSBIT: u8 = 0;
  pub const YSBIT: u8 = 1;
  pub const MWAIT: u8 = 2;
  /// Read-only.
  pub const XDEVIN: u8 = 3;
  pub const FLOPS: u8 = 4;
  pub const LXMIT: u8 = 6;
  pub const SXMIT: u8 = 7;
}

/// Bit positions inside `REG22`.
pub mod reg22 {
  pub const WRAP: u8 = 0;
  pub const STRANSP: u8 = 1;
  pub const FORCEB3: u8 = 2;
  pub const SCALE: u8 = 4;
  pub const MENB: u8 = 5;
  pub const REMOTE: u8 = 6;
}

/// Bit positions inside `REG23`.
pub mod reg23 {
  pub const BLOCK3: u8 = 0;
  pub const MCOMDIS: u8 = 1;
  pub const POWERUP: u8 = 2;
  pub const SKIPPOTS: u8 = 3;
  pub const SETPOTS: u8 = 4;
  pub const RERROR: u8 = 5;
  pub const BYTE1X: u8 = 6;
  pub const SKIPDRIFT: u8 = 7;
}

/// Bit positions inside `POST` (read-only).
pub mod post {
  pub const RAMFAIL: u8 = 0;
  pub const ROMFAIL: u8 = 1;
  pub const XFAIL: u8 = 3;
  pub const YFAIL: u8 = 4;
  pub const MOUFAIL: u8 = 5;
}

/// Bit positions inside `MOUSTAT`.
pub mod moustat {
  pub const MLEFT: u8 = 0;
  pub const MRGHT: u8 = 1;
  pub const MMIDB: u8 = 2;
  pub const XSIGN: u8 = 4;
  pub const YSIGN: u8 = 5;
  pub const XOVER: u8 = 6;
  pub const YOVER: u8 = 7;
}

/// Bit positions inside `CURSTAT`.
pub mod curstat {
  pub const LEFT: u8 = 0;
  pub const RIGHT: u8 = 1;
  pub const MIDDLE: u8 = 2;
  /// Unused, must always read back as 1.
  pub const ALWAYS_ONE: u8 = 3;
  pub const XACBIT: u8 = 4;
  pub const YACBIT: u8 = 5;
  pub const OVERX: u8 = 6;
  pub const OVERY: u8 = 7;
}

/// Bit positions inside `REG28`.
pub mod reg28 {
  pub const LSSIGN1: u8 = 0;
  pub const LSSIGN2: u8 = 1;
  pub const HYSFLG: u8 = 2;
  pub const UPHIT: u8 = 3;
  pub const JKFLG: u8 = 4;
  pub const REL: u8 = 5;
  pub const KBURST: u8 = 7;
}

/// Bit positions inside `REG29`.
pub mod reg29 {
  pub const DACDBB: u8 = 1;
  pub const M_DIR: u8 = 2;
  pub const DAT_BIT: u8 = 3;
  pub const ARB: u8 = 4;
  pub const QUIET: u8 = 5;
  pub const TPTURN: u8 = 6;
  pub const BACKING: u8 = 7;
}

/// Bit positions inside `REG2A`.
pub mod reg2a {
  pub const E2MATCH: u8 = 0;
  pub const MRESET: u8 = 1;
  pub const DOS4FIX: u8 = 2;
  pub const PSBIT: u8 = 3;
  pub const XCIP: u8 = 4;
  pub const YCIP: u8 = 5;
  pub const PCIP: u8 = 6;
  pub const SKIPZ: u8 = 7;
}

/// Bit positions inside `REG2B`.
pub mod reg2b {
  pub const MBIT1: u8 = 0;
  pub const MBIT2: u8 = 1;
  pub const MBIT3: u8 = 2;
  pub const NEW_MBYTE: u8 = 3;
  pub const LONG_MOUSE: u8 = 4;
  pub const MPENDING: u8 = 5;
  pub const MBUSY: u8 = 6;
  pub const MTIMEOUT: u8 = 7;
}

/// Bit positions inside `CONFIG`.
pub mod config {
  /// Press-to-select.
  pub const PTSON: u8 = 0;
  pub const HALFTAC: u8 = 1;
  /// Set on two-button TrackPoints.
  pub const BUTTON2: u8 = 2;
  pub const FLIPX: u8 = 3;
  pub const FLIPY: u8 = 4;
  pub const FLIPZ: u8 = 5;
  pub const SWAPXY: u8 = 6;
  /// Hard transparent mode. Sticky until a power-on reset.
  pub const FTRANS: u8 = 7;
}

/// Bit positions inside `REG2D`.
pub mod reg2d {
  pub const TWO_HANDED: u8 = 0;
  pub const NMBBIT: u8 = 1;
  pub const STICKY2: u8 = 2;
  pub const SKIPBACK: u8 = 3;
  pub const REMMOUENB: u8 = 4;
  pub const SKIPZSTEP: u8 = 5;
  pub const MSFIX: u8 = 6;
  pub const NOSYNC: u8 = 7;
}

/// Bit positions inside `REG2E`.
pub mod reg2e {
  pub const SAVEET1: u8 = 0;
  pub const SAVETR1: u8 = 1;
  pub const MPARITY: u8 = 2;
  pub const DRIFTING: u8 = 3;
  pub const STEPPING: u8 = 4;
  pub const SKIPTAC: u8 = 5;
  pub const BAD_COMMAND: u8 = 6;
  pub const STOPF4: u8 = 7;
}

/// Typed view of the `CONFIG` register (0x2C).
#[bitfield(u8, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct ConfigFlags {
  pub press_to_select: bool,
  pub half_tactile: bool,
  pub two_buttons: bool,
  pub flip_x: bool,
  pub flip_y: bool,
  pub flip_z: bool,
  pub swap_xy: bool,
  pub hard_transparent: bool,
}

/// Typed view of the `POST` result register (0x25).
#[bitfield(u8, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct PostResult {
  pub ram_fail: bool,
  pub rom_fail: bool,
  __: bool,
  pub x_fail: bool,
  pub y_fail: bool,
  pub mouse_fail: bool,
  #[bits(2)]
  ___: u8,
}

impl PostResult {
  /// `true` when no failure bit is set.
  pub const fn passed(&self) -> bool {
    !(self.ram_fail() || self.rom_fail() || self.x_fail() || self.y_fail() || self.mouse_fail())
  }
}
