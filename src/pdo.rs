//! Process data object (PDO) records and their wire layout.
//!
//! Two fixed-layout records travel between the hub and the satellites:
//!
//! | Record              | Direction         | Packed size | Wire length |
//! |---------------------|-------------------|-------------|-------------|
//! | [`TelemetryRecord`] | satellite → hub   | 40 bytes    | 48 bytes    |
//! | [`CommandRecord`]   | hub → satellite   | 24 bytes    | 24 bytes    |
//!
//! Every field is 32 bits wide and written in the host's native byte order, so the wire
//! image is identical to the `#[repr(C)]` in-memory layout. Both node roles run on the same
//! architecture; no endianness conversion is performed.
//!
//! The [`Pdo`] trait lets the receive drain, the state table and the transmit assembler
//! treat both records uniformly.

use crate::consts::{COMMAND_RECORD_LEN, COMMAND_WIRE_LEN, TELEMETRY_RECORD_LEN, TELEMETRY_WIRE_LEN};
use crate::frame::FrameError;

/// Which of the two records a frame or table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdoKind {
    /// Motor status, produced by a satellite.
    Telemetry,
    /// Motor goals, produced by the hub.
    Command,
}

impl PdoKind {
    /// Short lowercase name, for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            PdoKind::Telemetry => "telemetry",
            PdoKind::Command => "command",
        }
    }
}

/// A fixed-layout record that can be carried in one CAN-FD frame.
pub trait Pdo: Copy {
    /// Which direction this record travels in.
    const KIND: PdoKind;
    /// Packed size of the record.
    const RECORD_LEN: usize;
    /// Length of the frame payload carrying the record (zero-padded).
    const WIRE_LEN: usize;
    /// The all-zero record every table slot starts with.
    const ZERO: Self;

    /// Raw motor index embedded in the payload. Not range-checked.
    fn motor_id(&self) -> u32;

    /// Overwrites the embedded motor index.
    fn set_motor_id(&mut self, motor_id: u32);

    /// Writes the packed record to the front of `out`.
    ///
    /// # Returns
    /// - `Ok(len)`: number of bytes written ([`Pdo::RECORD_LEN`])
    /// - `Err(FrameError::BufferTooSmall)`: `out` is shorter than the record
    fn encode_into(&self, out: &mut [u8]) -> Result<usize, FrameError>;

    /// Reads a record from the front of `bytes`. Trailing padding is ignored.
    ///
    /// Never reads past `bytes.len()`; a short buffer yields
    /// [`FrameError::Truncated`].
    fn decode(bytes: &[u8]) -> Result<Self, FrameError>;
}

/// Motor status reported by a satellite.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryRecord {
    /// Slot this record belongs to (0..15).
    pub motor_id: u32,
    /// Measured d-axis current.
    pub current_d: f32,
    /// Measured q-axis current.
    pub current_q: f32,
    /// Measured velocity.
    pub velocity: f32,
    /// Measured position.
    pub position: f32,
    /// Supply voltage at the power stage.
    pub input_voltage: f32,
    /// Motor winding temperature.
    pub winding_temp: f32,
    /// Power stage temperature.
    pub powerstage_temp: f32,
    /// Controller IC temperature.
    pub ic_temp: f32,
    /// Drive error status, as reported by the motor controller.
    pub error_status: f32,
}

/// Motor goals sent by the hub.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommandRecord {
    /// Slot this record belongs to (0..15).
    pub motor_id: u32,
    /// Non-zero enables torque output.
    pub torque_enable: u32,
    /// d-axis current goal.
    pub goal_current_d: f32,
    /// q-axis current goal.
    pub goal_current_q: f32,
    /// Velocity goal.
    pub goal_velocity: f32,
    /// Position goal.
    pub goal_position: f32,
}

// The wire image is the in-memory image; keep them in lock-step.
const _: () = assert!(size_of::<TelemetryRecord>() == TELEMETRY_RECORD_LEN);
const _: () = assert!(size_of::<CommandRecord>() == COMMAND_RECORD_LEN);

const TELEMETRY_WORDS: usize = TELEMETRY_RECORD_LEN / 4;
const COMMAND_WORDS: usize = COMMAND_RECORD_LEN / 4;

fn write_words(words: &[u32], out: &mut [u8]) -> Result<usize, FrameError> {
    let len = words.len() * 4;
    if out.len() < len {
        return Err(FrameError::BufferTooSmall {
            needed: len,
            available: out.len(),
        });
    }
    for (chunk, word) in out[..len].chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_ne_bytes());
    }
    Ok(len)
}

fn read_words<const N: usize>(bytes: &[u8]) -> Result<[u32; N], FrameError> {
    let len = N * 4;
    if bytes.len() < len {
        return Err(FrameError::Truncated {
            expected: len,
            actual: bytes.len(),
        });
    }
    let mut words = [0u32; N];
    for (word, chunk) in words.iter_mut().zip(bytes[..len].chunks_exact(4)) {
        *word = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(words)
}

impl TelemetryRecord {
    /// Packs the record into its 40-byte wire image.
    pub fn encode(&self) -> [u8; TELEMETRY_RECORD_LEN] {
        let mut out = [0u8; TELEMETRY_RECORD_LEN];
        let _ = write_words(&self.to_words(), &mut out);
        out
    }

    fn to_words(&self) -> [u32; TELEMETRY_WORDS] {
        [
            self.motor_id,
            self.current_d.to_bits(),
            self.current_q.to_bits(),
            self.velocity.to_bits(),
            self.position.to_bits(),
            self.input_voltage.to_bits(),
            self.winding_temp.to_bits(),
            self.powerstage_temp.to_bits(),
            self.ic_temp.to_bits(),
            self.error_status.to_bits(),
        ]
    }

    fn from_words(w: [u32; TELEMETRY_WORDS]) -> Self {
        Self {
            motor_id: w[0],
            current_d: f32::from_bits(w[1]),
            current_q: f32::from_bits(w[2]),
            velocity: f32::from_bits(w[3]),
            position: f32::from_bits(w[4]),
            input_voltage: f32::from_bits(w[5]),
            winding_temp: f32::from_bits(w[6]),
            powerstage_temp: f32::from_bits(w[7]),
            ic_temp: f32::from_bits(w[8]),
            error_status: f32::from_bits(w[9]),
        }
    }
}

impl Pdo for TelemetryRecord {
    const KIND: PdoKind = PdoKind::Telemetry;
    const RECORD_LEN: usize = TELEMETRY_RECORD_LEN;
    const WIRE_LEN: usize = TELEMETRY_WIRE_LEN;
    const ZERO: Self = Self {
        motor_id: 0,
        current_d: 0.0,
        current_q: 0.0,
        velocity: 0.0,
        position: 0.0,
        input_voltage: 0.0,
        winding_temp: 0.0,
        powerstage_temp: 0.0,
        ic_temp: 0.0,
        error_status: 0.0,
    };

    fn motor_id(&self) -> u32 {
        self.motor_id
    }

    fn set_motor_id(&mut self, motor_id: u32) {
        self.motor_id = motor_id;
    }

    fn encode_into(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        write_words(&self.to_words(), out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        read_words::<TELEMETRY_WORDS>(bytes).map(Self::from_words)
    }
}

impl CommandRecord {
    /// Packs the record into its 24-byte wire image.
    pub fn encode(&self) -> [u8; COMMAND_RECORD_LEN] {
        let mut out = [0u8; COMMAND_RECORD_LEN];
        let _ = write_words(&self.to_words(), &mut out);
        out
    }

    /// Whether torque output is requested.
    pub fn is_enabled(&self) -> bool {
        self.torque_enable != 0
    }

    fn to_words(&self) -> [u32; COMMAND_WORDS] {
        [
            self.motor_id,
            self.torque_enable,
            self.goal_current_d.to_bits(),
            self.goal_current_q.to_bits(),
            self.goal_velocity.to_bits(),
            self.goal_position.to_bits(),
        ]
    }

    fn from_words(w: [u32; COMMAND_WORDS]) -> Self {
        Self {
            motor_id: w[0],
            torque_enable: w[1],
            goal_current_d: f32::from_bits(w[2]),
            goal_current_q: f32::from_bits(w[3]),
            goal_velocity: f32::from_bits(w[4]),
            goal_position: f32::from_bits(w[5]),
        }
    }
}

impl Pdo for CommandRecord {
    const KIND: PdoKind = PdoKind::Command;
    const RECORD_LEN: usize = COMMAND_RECORD_LEN;
    const WIRE_LEN: usize = COMMAND_WIRE_LEN;
    const ZERO: Self = Self {
        motor_id: 0,
        torque_enable: 0,
        goal_current_d: 0.0,
        goal_current_q: 0.0,
        goal_velocity: 0.0,
        goal_position: 0.0,
    };

    fn motor_id(&self) -> u32 {
        self.motor_id
    }

    fn set_motor_id(&mut self, motor_id: u32) {
        self.motor_id = motor_id;
    }

    fn encode_into(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        write_words(&self.to_words(), out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        read_words::<COMMAND_WORDS>(bytes).map(Self::from_words)
    }
}
