use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::defs::*;
use crate::ps2::Ps2Transport;
use crate::{Error, TrackPoint};

/// Plug and Play identification record reported by `READ EXTENDED ID`.
///
/// A TrackPoint answers with something like
/// `M 19980216 RSO($dIBM3780\\MOUSE\PNP0F19\IBM TrackPoint Version 4.0 YKT3B\xx)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedId {
  /// Free text before the opening parenthesis.
  pub other_id: String<16>,
  pub pnp_revision: u16,
  pub manufacturer_id: String<3>,
  pub product_no: String<3>,
  /// `'0'` or `'1'`, following the `BUTTON2` bit of `CONFIG`.
  pub product_revision: u8,
  pub serial_no: Option<u32>,
  pub class_id: String<32>,
  pub driver_id: String<40>,
  pub user_name: String<40>,
  /// Checksum as transmitted.
  pub checksum: u8,
  /// Checksum computed over the received record.
  pub checksum_counted: u8,
  /// The closing parenthesis was seen.
  pub complete: bool,
}

impl ExtendedId {
  /// `true` for a complete record whose checksum matches.
  pub fn checksum_ok(&self) -> bool {
    self.complete && self.checksum == self.checksum_counted
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
  OtherId,
  PnpRevision,
  ManufacturerId,
  ProductNo,
  ProductRevision,
  SerialNoOption,
  SerialNo,
  ClassIdOption,
  ClassId,
  DriverId,
  UserName,
  Checksum,
  EndPnp,
  Done,
}

/// Byte-at-a-time decoder for [`ExtendedId`].
///
/// Unexpected bytes are logged and skipped over; the record that was built so
/// far is always available.
#[derive(Debug, Clone)]
pub struct ExtendedIdParser {
  id: ExtendedId,
  state: State,
  pos: u8,
  checksum: u8,
  malformed: bool,
}

impl ExtendedIdParser {
  pub fn new() -> Self {
    Self { id: ExtendedId::default(), state: State::OtherId, pos: 0, checksum: 0, malformed: false }
  }

  /// `true` once the closing parenthesis has been consumed.
  pub fn is_done(&self) -> bool {
    self.state == State::Done
  }

  /// `true` if any byte did not fit the expected layout.
  pub fn is_malformed(&self) -> bool {
    self.malformed
  }

  pub fn finish(self) -> ExtendedId {
    self.id
  }

  /// Feed one byte. Returns `true` when the record is complete.
  pub fn push(&mut self, byte: u8) -> bool {
    if self.state == State::Done {
      return true;
    }
    self.checksum = self.checksum.wrapping_add(byte);

    match self.state {
      State::OtherId => {
        if byte == b'(' {
          self.pos = 0;
          self.checksum = b'(';
          self.state = State::PnpRevision;
        } else {
          let ok = self.id.other_id.push(char::from(byte)).is_ok();
          self.check(ok, "other id too long");
        }
      }

      State::PnpRevision => {
        if self.pos == 0 {
          self.id.pnp_revision = u16::from(byte);
          self.pos = 1;
        } else {
          self.id.pnp_revision = ((self.id.pnp_revision & 0x3F) << 6) | u16::from(byte & 0x3F);
          self.pos = 0;
          self.state = State::ManufacturerId;
        }
      }

      State::ManufacturerId => {
        let _ = self.id.manufacturer_id.push(char::from(byte));
        self.advance_fixed(3, State::ProductNo);
      }

      State::ProductNo => {
        let _ = self.id.product_no.push(char::from(byte));
        self.advance_fixed(3, State::ProductRevision);
      }

      State::ProductRevision => {
        self.id.product_revision = byte;
        self.state = State::SerialNoOption;
      }

      State::SerialNoOption => {
        self.check(byte == b'\\', "missing serial number marker");
        self.state = State::SerialNo;
      }

      State::SerialNo => {
        if self.pos == 0 && byte == b'\\' {
          self.id.serial_no = None;
          self.state = State::ClassId;
        } else {
          let nibble = self.nibble(byte);
          let serial = self.id.serial_no.unwrap_or(0);
          self.id.serial_no = Some((serial << 4) | u32::from(nibble));
          self.advance_fixed(8, State::ClassIdOption);
        }
      }

      State::ClassIdOption => {
        self.check(byte == b'\\', "missing class id marker");
        self.state = State::ClassId;
      }

      State::ClassId => {
        if byte == b'\\' {
          self.state = State::DriverId;
        } else {
          let ok = self.id.class_id.push(char::from(byte)).is_ok();
          self.check(ok, "class id too long");
        }
      }

      State::DriverId => {
        if byte == b'\\' {
          self.state = State::UserName;
        } else {
          let ok = self.id.driver_id.push(char::from(byte)).is_ok();
          self.check(ok, "driver id too long");
        }
      }

      State::UserName => {
        if byte == b'\\' {
          self.state = State::Checksum;
        } else {
          let ok = self.id.user_name.push(char::from(byte)).is_ok();
          self.check(ok, "user name too long");
        }
      }

      State::Checksum => {
        // The checksum characters are not part of the sum.
        self.checksum = self.checksum.wrapping_sub(byte);
        let nibble = self.nibble(byte);
        self.id.checksum = (self.id.checksum << 4) | nibble;
        self.advance_fixed(2, State::EndPnp);
      }

      State::EndPnp => {
        self.check(byte == b')', "missing end marker");
        self.id.checksum_counted = self.checksum;
        self.id.complete = true;
        self.state = State::Done;
      }

      State::Done => {}
    }

    self.is_done()
  }

  fn advance_fixed(&mut self, width: u8, next: State) {
    self.pos += 1;
    if self.pos == width {
      self.pos = 0;
      self.state = next;
    }
  }

  fn nibble(&mut self, byte: u8) -> u8 {
    let value = (byte as char).to_digit(16);
    self.check(value.is_some(), "bad hex digit");
    value.unwrap_or(0) as u8
  }

  fn check(&mut self, ok: bool, what: &'static str) {
    if !ok {
      warn!("extended id: {}", what);
      self.malformed = true;
    }
  }
}

impl Default for ExtendedIdParser {
  fn default() -> Self {
    Self::new()
  }
}

impl<P, E, D> TrackPoint<P, D>
where
  P: Ps2Transport<Error = E>,
  D: DelayNs,
{
  /// Request and decode the extended identification record.
  ///
  /// Reads until the closing parenthesis or 256 bytes, whichever comes first.
  /// A checksum mismatch is logged, not returned as an error.
  pub fn read_extended_id(&mut self) -> Result<ExtendedId, Error<E>> {
    self.command(&[READ_EXTENDED_ID])?;
    self.response = [0; RESPONSE_LEN];

    let mut parser = ExtendedIdParser::new();
    for _ in 0..EXTENDED_ID_LEN {
      let byte = self.ps2.receive().map_err(Error::Transport)?;
      if parser.push(byte) {
        break;
      }
    }

    let id = parser.finish();
    if !id.complete {
      warn!("extended id: truncated after {} bytes", EXTENDED_ID_LEN);
    } else if id.checksum != id.checksum_counted {
      warn!("extended id: checksum {=u8:#x}, counted {=u8:#x}", id.checksum, id.checksum_counted);
    }
    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  use core::fmt::Write;

  use heapless::Vec;

  use super::*;
  use crate::mock::ready;
  use crate::Ps2Error;

  const BODY: &[u8] = b"($dIBM3780\\\\MOUSE\\PNP0F19\\IBM TrackPoint Version 4.0 YKT3B\\";

  fn checksum_of(body: &[u8]) -> u8 {
    body.iter().fold(b')', |sum, &b| sum.wrapping_add(b))
  }

  /// Full record with a correct checksum.
  fn record(prefix: &[u8], body: &[u8]) -> Vec<u8, 128> {
    let mut hex: String<2> = String::new();
    let _ = write!(hex, "{:02X}", checksum_of(body));

    let mut out = Vec::new();
    let _ = out.extend_from_slice(prefix);
    let _ = out.extend_from_slice(body);
    let _ = out.extend_from_slice(hex.as_bytes());
    let _ = out.push(b')');
    out
  }

  fn parse(bytes: &[u8]) -> ExtendedIdParser {
    let mut parser = ExtendedIdParser::new();
    for &b in bytes {
      if parser.push(b) {
        break;
      }
    }
    parser
  }

  #[test]
  fn parses_trackpoint_record() {
    let bytes = record(b"M 19980216 RSO", BODY);
    let parser = parse(&bytes);
    assert!(parser.is_done());
    assert!(!parser.is_malformed());

    let id = parser.finish();
    assert_eq!(id.other_id.as_str(), "M 19980216 RSO");
    assert_eq!(id.pnp_revision, ((b'$' as u16 & 0x3F) << 6) | (b'd' as u16 & 0x3F));
    assert_eq!(id.manufacturer_id.as_str(), "IBM");
    assert_eq!(id.product_no.as_str(), "378");
    assert_eq!(id.product_revision, b'0');
    assert_eq!(id.serial_no, None);
    assert_eq!(id.class_id.as_str(), "MOUSE");
    assert_eq!(id.driver_id.as_str(), "PNP0F19");
    assert_eq!(id.user_name.as_str(), "IBM TrackPoint Version 4.0 YKT3B");
    assert_eq!(id.checksum, checksum_of(BODY));
    assert!(id.checksum_ok());
  }

  #[test]
  fn parses_serial_number() {
    let body = b"($dIBM3781\\0012ABCD\\MOUSE\\PNP0F19\\TP\\";
    let id = parse(&record(b"", body)).finish();
    assert_eq!(id.serial_no, Some(0x0012_ABCD));
    assert_eq!(id.class_id.as_str(), "MOUSE");
    assert_eq!(id.user_name.as_str(), "TP");
    assert!(id.checksum_ok());
  }

  #[test]
  fn checksum_mismatch_is_reported_not_fatal() {
    let mut bytes = record(b"", BODY);
    // Corrupt one character of the user name.
    let at = bytes.iter().position(|&b| b == b'Y').unwrap_or(0);
    bytes[at] = b'Z';

    let parser = parse(&bytes);
    assert!(parser.is_done());
    let id = parser.finish();
    assert!(id.complete);
    assert!(!id.checksum_ok());
    assert_eq!(id.user_name.as_str(), "IBM TrackPoint Version 4.0 ZKT3B");
  }

  #[test]
  fn malformed_markers_are_tolerated() {
    let body = b"($dIBM3780X\\MOUSE\\PNP0F19\\TP\\";
    let parser = parse(&record(b"", body));
    assert!(parser.is_malformed());
    assert!(parser.is_done());
    assert_eq!(parser.finish().manufacturer_id.as_str(), "IBM");
  }

  #[test]
  fn record_without_product_revision_is_flagged() {
    // The revision digit after the product number is missing, so every later
    // field is read one position early.
    let bytes = b"M 19980216 RSO($dIBM378\\MOUSE\\PNP0F19\\IBM TrackPoint Version 4.0 YKT3B\\7F)";
    let parser = parse(bytes);

    assert!(parser.is_malformed());
    assert!(!parser.is_done());

    let id = parser.finish();
    assert!(!id.complete);
    assert!(!id.checksum_ok());
    assert_eq!(id.manufacturer_id.as_str(), "IBM");
    assert_eq!(id.product_no.as_str(), "378");
    assert_eq!(id.product_revision, b'\\');
    assert_eq!(id.class_id.as_str(), "F19");
    assert_eq!(id.driver_id.as_str(), "IBM TrackPoint Version 4.0 YKT3B");
    assert_eq!(id.user_name.as_str(), "7F)");
  }

  #[test]
  fn overlong_fields_are_capped() {
    let mut parser = ExtendedIdParser::new();
    for _ in 0..40 {
      parser.push(b'x');
    }
    assert!(parser.is_malformed());
    assert_eq!(parser.finish().other_id.len(), 16);
  }

  #[test]
  fn session_reads_record() {
    const RECORD: &[u8] = b"M 19980216 RSO($dIBM3780\\\\MOUSE\\PNP0F19\\IBM TrackPoint Version 4.0 YKT3B\\00)";

    let mut tp = ready();
    tp.ps2.extended_id = RECORD;
    let id = tp.read_extended_id().expect("extended id");

    assert_eq!(tp.ps2.sent.as_slice(), &[READ_EXTENDED_ID]);
    assert_eq!(tp.ps2.receives, RECORD.len());
    assert!(id.complete);
    assert_eq!(id.manufacturer_id.as_str(), "IBM");
    assert_eq!(id.checksum, 0);
    assert!(!id.checksum_ok());
  }

  #[test]
  fn session_stops_after_256_bytes() {
    static NOISE: [u8; 300] = [b'x'; 300];
    let mut tp = ready();
    tp.ps2.extended_id = &NOISE;

    let id = tp.read_extended_id().expect("extended id");
    assert!(!id.complete);
    assert_eq!(tp.ps2.receives, EXTENDED_ID_LEN);
  }

  #[test]
  fn session_propagates_silence() {
    let mut tp = ready();
    tp.ps2.extended_id = b"M 1998(";
    assert!(matches!(tp.read_extended_id(), Err(Error::Transport(Ps2Error::Timeout(_)))));
  }
}
