use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use heapless::spsc::{Consumer, Producer, Queue};

use super::{FrameDecoder, Ps2Error};

type Received = Result<u8, Ps2Error>;

#[derive(Debug)]
struct LinkState {
  busy: AtomicBool,
  dropped: AtomicU8,
}

/// Receive buffer shared between the clock interrupt and the main loop.
///
/// Place it in a `static` and [`split`](Ps2Link::split) it once during start-up.
/// `N` is the queue size; one slot stays unused, so it holds `N - 1` bytes.
pub struct Ps2Link<const N: usize> {
  queue: Queue<Received, N>,
  state: LinkState,
}

impl<const N: usize> Ps2Link<N> {
  pub const fn new() -> Self {
    Self {
      queue: Queue::new(),
      state: LinkState { busy: AtomicBool::new(false), dropped: AtomicU8::new(0) },
    }
  }

  /// Split into the interrupt half and the main-loop half.
  pub fn split(&mut self) -> (Ps2Receiver<'_, N>, RxQueue<'_, N>) {
    let (producer, consumer) = self.queue.split();
    let state = &self.state;
    (Ps2Receiver { producer, state, frame: FrameDecoder::new() }, RxQueue { consumer, state })
  }
}

impl<const N: usize> Default for Ps2Link<N> {
  fn default() -> Self {
    Self::new()
  }
}

/// Interrupt half of a [`Ps2Link`]. Never blocks.
pub struct Ps2Receiver<'a, const N: usize> {
  producer: Producer<'a, Received, N>,
  state: &'a LinkState,
  frame: FrameDecoder,
}

impl<'a, const N: usize> Ps2Receiver<'a, N> {
  /// Call from the falling-edge clock interrupt with the sampled data line.
  ///
  /// Edges are ignored while the host itself is driving the bus.
  pub fn on_clock_falling(&mut self, data_high: bool) {
    if self.state.busy.load(Ordering::Acquire) {
      self.frame.reset();
      return;
    }

    if let Some(received) = self.frame.push(data_high) {
      if self.producer.enqueue(received).is_err() {
        let dropped = self.state.dropped.load(Ordering::Relaxed);
        self.state.dropped.store(dropped.saturating_add(1), Ordering::Relaxed);
      }
    }
  }

  /// Discard a half-received frame, e.g. after an inter-bit timeout.
  pub fn resync(&mut self) {
    self.frame.reset();
  }
}

/// Main-loop half of a [`Ps2Link`].
pub struct RxQueue<'a, const N: usize> {
  consumer: Consumer<'a, Received, N>,
  state: &'a LinkState,
}

impl<'a, const N: usize> RxQueue<'a, N> {
  /// Next decoded byte, or the frame error the interrupt saw in its place.
  pub fn dequeue(&mut self) -> Option<Received> {
    self.consumer.dequeue()
  }

  /// Drop everything received so far.
  pub fn clear(&mut self) {
    while self.consumer.dequeue().is_some() {}
  }

  pub fn len(&self) -> usize {
    self.consumer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Mark the bus as host-driven so the interrupt ignores the clock.
  pub fn set_busy(&self, busy: bool) {
    self.state.busy.store(busy, Ordering::Release);
  }

  /// Bytes lost to a full queue since the link was created (saturating).
  pub fn dropped(&self) -> u8 {
    self.state.dropped.load(Ordering::Relaxed)
  }
}
