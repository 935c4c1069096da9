use crate::table::{RegisterTable, Variant};

/// Driver settings fixed at construction.
///
/// The register table decides which locations make up a configuration
/// snapshot and what their defaults are. The remaining fields seed the session
/// state and the first-run configuration written when no snapshot is stored.
///
/// ```ignore
/// use trackpoint::{Config, Variant};
///
/// let config = Config::default()
///   .with_variant(Variant::Ssmx)
///   .with_sensitivity(0xB0, 0x40)
///   .with_scroll_divisors(4, 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Config {
  pub table: &'static RegisterTable,
  /// Sensitivity used outside precision mode.
  pub normal_sensitivity: u8,
  /// Sensitivity used while precision mode is active.
  pub precision_sensitivity: u8,
  pub scroll_divisor_h: u8,
  pub scroll_divisor_v: u8,
  /// Upper plateau of the transfer function (`VALUE6`) written on first run.
  pub plateau: u8,
  /// Enable press-to-select on first run.
  pub press_to_select: bool,
  pub hard_reset_ms: u32,
  pub soft_reset_ms: u32,
}

impl Config {
  pub const fn new() -> Self {
    Self {
      table: Variant::Mx13.table(),
      normal_sensitivity: 0xC0,
      precision_sensitivity: 64,
      scroll_divisor_h: 3,
      scroll_divisor_v: 3,
      plateau: 150,
      press_to_select: true,
      hard_reset_ms: 300,
      soft_reset_ms: 100,
    }
  }

  pub const fn with_variant(mut self, variant: Variant) -> Self {
    self.table = variant.table();
    self
  }

  pub const fn with_table(mut self, table: &'static RegisterTable) -> Self {
    self.table = table;
    self
  }

  pub const fn with_sensitivity(mut self, normal: u8, precision: u8) -> Self {
    self.normal_sensitivity = normal;
    self.precision_sensitivity = precision;
    self
  }

  pub const fn with_scroll_divisors(mut self, horizontal: u8, vertical: u8) -> Self {
    self.scroll_divisor_h = horizontal;
    self.scroll_divisor_v = vertical;
    self
  }

  pub const fn with_plateau(mut self, plateau: u8) -> Self {
    self.plateau = plateau;
    self
  }

  pub const fn with_press_to_select(mut self, enable: bool) -> Self {
    self.press_to_select = enable;
    self
  }

  /// Time the device needs to finish its self-test after each reset kind.
  pub const fn with_reset_timing(mut self, hard_ms: u32, soft_ms: u32) -> Self {
    self.hard_reset_ms = hard_ms;
    self.soft_reset_ms = soft_ms;
    self
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}
