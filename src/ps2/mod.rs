//! PS/2 host side of the link.
//!
//! The driver only needs [`Ps2Transport`]. [`Ps2Host`] is a bit-banged
//! implementation over two open-drain GPIOs whose receive path is fed from the
//! clock interrupt through [`Ps2Link`].

mod frame;
mod host;
mod link;

pub use frame::FrameDecoder;
pub use host::Ps2Host;
pub use link::{Ps2Link, Ps2Receiver, RxQueue};

/// Byte-level access to a PS/2 device.
///
/// Implementations block until the byte has been clocked out (or in), or until
/// their own timeout expires.
pub trait Ps2Transport {
  type Error;

  /// Transmit one byte and return the device's single-byte acknowledgement.
  fn send(&mut self, byte: u8) -> Result<u8, Self::Error>;

  /// Receive the next byte sent by the device.
  fn receive(&mut self) -> Result<u8, Self::Error>;
}

impl<T: Ps2Transport + ?Sized> Ps2Transport for &mut T {
  type Error = T::Error;

  #[inline]
  fn send(&mut self, byte: u8) -> Result<u8, Self::Error> {
    T::send(self, byte)
  }

  #[inline]
  fn receive(&mut self) -> Result<u8, Self::Error> {
    T::receive(self)
  }
}

/// Failures of the bit-level link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ps2Error {
  /// A line did not reach the expected level in time. Carries the protocol
  /// step that was waiting (1..=9 while sending, 10 while receiving).
  Timeout(u8),
  /// Odd parity check failed on a received frame.
  Parity,
  /// Start or stop bit had the wrong level.
  Framing,
  /// A GPIO operation failed.
  Line,
}

/// Step reported by [`Ps2Error::Timeout`] when no byte arrives.
pub const RECEIVE_STEP: u8 = 10;
