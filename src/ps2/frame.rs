use super::Ps2Error;

/// Assembles device-to-host frames one data-line sample at a time.
///
/// A frame is 11 bits sampled on falling clock edges: start (0), eight data
/// bits LSB first, odd parity, stop (1).
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameDecoder {
  bit: u8,
  data: u8,
  ones: u8,
}

impl FrameDecoder {
  pub const fn new() -> Self {
    Self { bit: 0, data: 0, ones: 0 }
  }

  /// Drop a partially received frame.
  pub fn reset(&mut self) {
    *self = Self::new();
  }

  /// `true` while a frame is in progress.
  pub const fn in_frame(&self) -> bool {
    self.bit != 0
  }

  /// Feed the data-line level sampled on one falling clock edge.
  ///
  /// Returns `Some` once the stop bit has been seen.
  pub fn push(&mut self, high: bool) -> Option<Result<u8, Ps2Error>> {
    let bit = self.bit;
    self.bit += 1;

    match bit {
      0 => {
        if high {
          self.reset();
          return Some(Err(Ps2Error::Framing));
        }
      }
      1..=8 => {
        if high {
          self.data |= 1 << (bit - 1);
          self.ones += 1;
        }
      }
      9 => {
        if high {
          self.ones += 1;
        }
      }
      _ => {
        let (data, ones) = (self.data, self.ones);
        self.reset();
        return Some(if !high {
          Err(Ps2Error::Framing)
        } else if ones % 2 == 0 {
          Err(Ps2Error::Parity)
        } else {
          Ok(data)
        });
      }
    }
    None
  }
}

/// Odd parity bit for `byte`.
pub(crate) const fn odd_parity(byte: u8) -> bool {
  byte.count_ones() % 2 == 0
}

#[cfg(test)]
pub(crate) fn frame_bits(byte: u8) -> [bool; 11] {
  let mut bits = [false; 11];
  for (i, b) in bits[1..9].iter_mut().enumerate() {
    *b = byte & (1 << i) != 0;
  }
  bits[9] = odd_parity(byte);
  bits[10] = true;
  bits
}
