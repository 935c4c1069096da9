/******************************************************************************
 * Refer to the IBM TrackPoint System Version 4.0 Engineering Specification   *
 * (ykt3eext) for more information.                                           *
 * ========================================================================== *
 *                     TrackPoint - Command Set & Responses                   *
*******************************************************************************/

// Per-byte command responses
pub(crate) const ACK: u8 = 0xFA;
pub(crate) const RESEND: u8 = 0xFE;
pub(crate) const ERROR: u8 = 0xFC;

// Reset completion codes
pub(crate) const POST_PASSED: u8 = 0xAA;
pub(crate) const POST_FAILED: u8 = 0xFC;

/// Prefix of the TrackPoint extended command family.
pub(crate) const EXT: u8 = 0xE2;

// Extended commands (sent after `EXT`). Near RAM reads use the address itself as subcommand.
pub(crate) const READ_POST_RESULTS: u8 = 0x25;
pub(crate) const DISABLE_EXT_POINT_DEV: u8 = 0x40;
pub(crate) const ENABLE_EXT_POINT_DEV: u8 = 0x41;
pub(crate) const POWER_DOWN: u8 = 0x44;
pub(crate) const SET_HARD_TRANS_MODE: u8 = 0x45;
pub(crate) const READ_ROM_VERSION: u8 = 0x46;
pub(crate) const RAM_XOR: u8 = 0x47;
pub(crate) const TOGGLE_BLOCK_MIDDLE_BUTTON: u8 = 0x4C;
pub(crate) const SET_SOFT_TRANS_MODE: u8 = 0x4E;
pub(crate) const FORCE_RECALIBRATION: u8 = 0x51;
pub(crate) const TACTILE_OUTPUT_PULSE: u8 = 0x52;
pub(crate) const POWER_ON_RESET: u8 = 0x7F;
pub(crate) const RAM_READ_FAR: u8 = 0x80;
pub(crate) const RAM_WRITE: u8 = 0x81;
pub(crate) const CANCEL_SOFT_TRANS_MODE: u8 = 0xB9;

// Standard PS/2 mouse commands
pub(crate) const READ_EXTENDED_ID: u8 = 0xD0;
pub(crate) const READ_SECONDARY_ID: u8 = 0xE1;
pub(crate) const RESET_SCALING: u8 = 0xE6;
pub(crate) const SET_SCALING_2_1: u8 = 0xE7;
pub(crate) const SET_RESOLUTION: u8 = 0xE8;
pub(crate) const STATUS_REQUEST: u8 = 0xE9;
pub(crate) const SET_STREAM_MODE: u8 = 0xEA;
pub(crate) const READ_DATA: u8 = 0xEB;
pub(crate) const RESET_WRAP_MODE: u8 = 0xEC;
pub(crate) const SET_WRAP_MODE: u8 = 0xEE;
pub(crate) const SET_REMOTE_MODE: u8 = 0xF0;
pub(crate) const READ_DEVICE_TYPE: u8 = 0xF2;
pub(crate) const SET_SAMPLING_RATE: u8 = 0xF3;
pub(crate) const ENABLE: u8 = 0xF4;
pub(crate) const DISABLE: u8 = 0xF5;
pub(crate) const SET_DEFAULTS: u8 = 0xF6;
pub(crate) const RESET: u8 = 0xFF;

/// Longest response any single command produces (status request, extended ID excluded).
pub(crate) const RESPONSE_LEN: usize = 4;

/// Maximum length of the extended identification string.
pub(crate) const EXTENDED_ID_LEN: usize = 256;
