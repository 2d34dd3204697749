//! Constants used across the PDO synchronization layer.
//!
//! This module defines the motor count, the default identifier bases, the
//! record and wire sizes, and the CAN-FD limits every other module is sized by.
//!
//! ## Key Concepts
//!
//! - **Motor slots**: every table is exactly [`NUM_MOTORS`] entries long.
//! - **Identifier bases**: each direction owns `base ..= base + 14` standard identifiers.
//! - **Record vs. wire length**: records are densely packed; the wire frame may be
//!   zero-padded up to the next valid CAN-FD length.
//!
//! These values should be used wherever framing or slot logic is implemented to keep
//! both node roles interoperable.

/// Number of motor slots in every state table.
pub const NUM_MOTORS: usize = 15;

/// See [`NUM_MOTORS`]. Used for identifier arithmetic.
pub const NUM_MOTORS_U16: u16 = NUM_MOTORS as u16;

/// Default base identifier of the satellite → hub telemetry range (`0x200..=0x20E`).
pub const DEFAULT_TELEMETRY_BASE: u16 = 0x200;

/// Default base identifier of the hub → satellite command range (`0x300..=0x30E`).
pub const DEFAULT_COMMAND_BASE: u16 = 0x300;

/// Mask for an 11-bit standard identifier.
pub const STD_ID_MASK: u16 = 0x7ff;

/// Maximum CAN-FD payload length in bytes.
pub const MAX_FD_PAYLOAD: usize = 64;

/// Packed size of a telemetry record.
pub const TELEMETRY_RECORD_LEN: usize = 40;

/// Wire length of a telemetry frame (record zero-padded to a valid FD length).
pub const TELEMETRY_WIRE_LEN: usize = 48;

/// Packed size of a command record.
pub const COMMAND_RECORD_LEN: usize = 24;

/// Wire length of a command frame (24 is a valid FD length, no padding).
pub const COMMAND_WIRE_LEN: usize = 24;

/// Wire length of the all-zero keepalive frame.
pub const KEEPALIVE_WIRE_LEN: usize = 32;
