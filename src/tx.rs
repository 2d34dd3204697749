//! Transmit-side frame assembly.
//!
//! Builds the three outbound frame kinds:
//!
//! | Frame     | Identifier             | Payload                                  |
//! |-----------|------------------------|------------------------------------------|
//! | command   | command base + motor   | 24-byte [`CommandRecord`]                |
//! | telemetry | telemetry base + motor | 40-byte [`TelemetryRecord`], padded to 48 |
//! | keepalive | caller-chosen          | 32 zero bytes                            |
//!
//! All frames are FD frames with bit-rate switching. The record's embedded motor index is
//! always forced to the target slot before encoding. Enqueueing is attempted once; a full
//! queue is reported as `false` and left to the caller.

use crate::bus::FdCanBus;
use crate::config::RoleConfig;
use crate::consts::{KEEPALIVE_WIRE_LEN, MAX_FD_PAYLOAD, STD_ID_MASK};
use crate::frame::{FdFrame, FrameError};
use crate::motor::MotorIndex;
use crate::pdo::{CommandRecord, Pdo, TelemetryRecord};
use embedded_can::StandardId;

/// Masks `raw` to 11 bits and wraps it as a standard identifier.
pub fn std_id(raw: u16) -> StandardId {
    StandardId::new(raw & STD_ID_MASK).unwrap_or(StandardId::ZERO)
}

/// Frame carrying `record` for `slot`, on `base + slot`.
pub fn pdo_frame<P: Pdo>(base: u16, slot: MotorIndex, record: &P) -> Result<FdFrame, FrameError> {
    let mut record = *record;
    record.set_motor_id(slot.as_u32());
    let mut payload = [0u8; MAX_FD_PAYLOAD];
    let _ = record.encode_into(&mut payload)?;
    FdFrame::new(
        std_id(base.wrapping_add(slot.get() as u16)),
        &payload[..P::WIRE_LEN],
    )
}

/// Command frame for `slot`.
pub fn command_frame(
    config: &RoleConfig,
    slot: MotorIndex,
    record: &CommandRecord,
) -> Result<FdFrame, FrameError> {
    pdo_frame(config.command_base(), slot, record)
}

/// Telemetry frame for `slot`.
pub fn telemetry_frame(
    config: &RoleConfig,
    slot: MotorIndex,
    record: &TelemetryRecord,
) -> Result<FdFrame, FrameError> {
    pdo_frame(config.telemetry_base(), slot, record)
}

/// All-zero 32-byte keepalive on `raw_id` (masked to 11 bits).
pub fn keepalive_frame(raw_id: u16) -> Result<FdFrame, FrameError> {
    FdFrame::new(std_id(raw_id), &[0u8; KEEPALIVE_WIRE_LEN])
}

/// Queues `frame` once.
///
/// # Returns
/// - `true`: the frame is in the hardware transmit queue
/// - `false`: the queue was full or the controller refused it; nothing is retried
pub fn enqueue<B: FdCanBus>(bus: &mut B, frame: &FdFrame) -> bool {
    match bus.transmit(frame) {
        Ok(()) => true,
        Err(nb::Error::WouldBlock) => {
            debug!("tx queue full, dropping frame {}", frame.raw_id());
            false
        }
        Err(nb::Error::Other(_)) => {
            warn!("tx enqueue failed for frame {}", frame.raw_id());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{COMMAND_WIRE_LEN, TELEMETRY_RECORD_LEN, TELEMETRY_WIRE_LEN};
    use crate::mock::MockBus;

    fn slot(raw: u32) -> MotorIndex {
        MotorIndex::new(raw).unwrap()
    }

    #[test]
    fn test_command_frame_forces_slot() {
        let record = CommandRecord {
            motor_id: 3,
            torque_enable: 1,
            goal_position: 0.75,
            ..CommandRecord::ZERO
        };
        let frame = command_frame(&RoleConfig::hub(), slot(7), &record).unwrap();
        assert_eq!(frame.raw_id(), 0x307);
        assert_eq!(frame.len(), COMMAND_WIRE_LEN);
        assert!(frame.bit_rate_switch());
        assert!(frame.is_fd());

        let decoded = CommandRecord::decode(frame.data()).unwrap();
        assert_eq!(decoded.motor_id, 7);
        assert_eq!(
            decoded,
            CommandRecord {
                motor_id: 7,
                ..record
            }
        );
    }

    #[test]
    fn test_telemetry_frame_is_padded() {
        let record = TelemetryRecord {
            motor_id: 2,
            velocity: -4.5,
            ..TelemetryRecord::ZERO
        };
        let frame = telemetry_frame(&RoleConfig::satellite(), slot(2), &record).unwrap();
        assert_eq!(frame.raw_id(), 0x202);
        assert_eq!(frame.len(), TELEMETRY_WIRE_LEN);
        assert_eq!(frame.dlc_code(), 14);
        assert_eq!(&frame.data()[..TELEMETRY_RECORD_LEN], &record.encode());
        assert!(frame.data()[TELEMETRY_RECORD_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_telemetry_frame_forces_slot() {
        let record = TelemetryRecord {
            motor_id: 3,
            position: 1.5,
            ..TelemetryRecord::ZERO
        };
        let frame = telemetry_frame(&RoleConfig::satellite(), slot(7), &record).unwrap();
        assert_eq!(frame.raw_id(), 0x207);
        assert_eq!(frame.len(), TELEMETRY_WIRE_LEN);
        assert_eq!(
            TelemetryRecord::decode(frame.data()),
            Ok(TelemetryRecord {
                motor_id: 7,
                ..record
            })
        );
    }

    #[test]
    fn test_keepalive() {
        let frame = keepalive_frame(0x123).unwrap();
        assert_eq!(frame.raw_id(), 0x123);
        assert_eq!(frame.len(), KEEPALIVE_WIRE_LEN);
        assert_eq!(frame.dlc_code(), 13);
        assert!(frame.data().iter().all(|&b| b == 0));
        assert!(frame.bit_rate_switch());
    }

    #[test]
    fn test_identifier_is_masked() {
        assert_eq!(keepalive_frame(0x923).unwrap().raw_id(), 0x123);
        assert_eq!(std_id(0xffff).as_raw(), 0x7ff);
    }

    #[test]
    fn test_enqueue_reports_full_queue() {
        let mut bus = MockBus::with_tx_capacity(1);
        let frame = keepalive_frame(0x10).unwrap();
        assert!(enqueue(&mut bus, &frame));
        assert!(!enqueue(&mut bus, &frame));
        assert_eq!(bus.tx.len(), 1);

        bus.tx_error = true;
        bus.tx.clear();
        assert!(!enqueue(&mut bus, &frame));
        assert!(bus.tx.is_empty());
    }
}
