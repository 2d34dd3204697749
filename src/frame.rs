//! CAN-FD frames as seen by this layer.
//!
//! [`FdFrame`] is the unit exchanged with the hardware through
//! [`FdCanBus`](crate::bus::FdCanBus): an 11-bit identifier, the raw data length code,
//! the bit-rate-switch and FD-format flags, and up to 64 payload bytes.
//!
//! ## Data length codes
//!
//! CAN-FD only allows 16 payload lengths. Codes 0–8 map to the same byte count, the rest
//! map as follows:
//!
//! | DLC | 9  | 10 | 11 | 12 | 13 | 14 | 15 |
//! |-----|----|----|----|----|----|----|----|
//! | len | 12 | 16 | 20 | 24 | 32 | 48 | 64 |
//!
//! Outbound payloads are zero-padded up to the next valid length.

use crate::consts::MAX_FD_PAYLOAD;
use embedded_can::{Frame, Id, StandardId};
use heapless::Vec;
use thiserror::Error;

/// Framing and decoding failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The payload is shorter than the record it should carry.
    #[error("payload too short: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the record needs.
        expected: usize,
        /// Bytes the frame declared.
        actual: usize,
    },
    /// The payload does not fit in a CAN-FD frame.
    #[error("payload of {0} bytes exceeds the CAN-FD maximum of 64")]
    TooLong(usize),
    /// An output buffer cannot hold the encoded record.
    #[error("buffer of {available} bytes cannot hold {needed} bytes")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes provided.
        available: usize,
    },
}

const FD_LENGTHS: [usize; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 12, 16, 20, 24, 32, 48, 64];

/// Payload length for a raw data length code. Only the low four bits are used.
pub const fn dlc_to_len(dlc: u8) -> usize {
    FD_LENGTHS[(dlc & 0x0f) as usize]
}

/// Data length code for an exact payload length, if the length is a valid FD length.
pub fn len_to_dlc(len: usize) -> Option<u8> {
    FD_LENGTHS.iter().position(|&l| l == len).map(|code| code as u8)
}

/// Smallest valid FD payload length that can hold `len` bytes.
pub fn padded_len(len: usize) -> Option<usize> {
    FD_LENGTHS.iter().copied().find(|&l| l >= len)
}

/// A standard-identifier CAN-FD data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdFrame {
    id: StandardId,
    dlc: u8,
    brs: bool,
    fd: bool,
    data: Vec<u8, MAX_FD_PAYLOAD>,
}

impl FdFrame {
    /// Builds an outbound FD frame with bit-rate switching on.
    ///
    /// The payload is zero-padded to the next valid FD length.
    ///
    /// # Errors
    /// [`FrameError::TooLong`] when `payload` exceeds 64 bytes.
    pub fn new(id: StandardId, payload: &[u8]) -> Result<Self, FrameError> {
        let too_long = FrameError::TooLong(payload.len());
        let len = padded_len(payload.len()).ok_or(too_long)?;
        let dlc = len_to_dlc(len).ok_or(too_long)?;
        let mut data = Vec::new();
        data.extend_from_slice(payload).map_err(|_| too_long)?;
        data.resize(len, 0).map_err(|_| too_long)?;
        Ok(Self {
            id,
            dlc,
            brs: true,
            fd: true,
            data,
        })
    }

    /// Wraps a frame read from the hardware.
    ///
    /// Only the bytes covered by `dlc` are kept. If the driver hands over fewer bytes
    /// than declared, the frame carries just those.
    pub fn from_received(id: StandardId, dlc: u8, brs: bool, fd: bool, bytes: &[u8]) -> Self {
        let dlc = dlc & 0x0f;
        let len = dlc_to_len(dlc).min(bytes.len());
        let mut data = Vec::new();
        // `len` never exceeds MAX_FD_PAYLOAD.
        let _ = data.extend_from_slice(&bytes[..len]);
        Self {
            id,
            dlc,
            brs,
            fd,
            data,
        }
    }

    /// The 11-bit identifier.
    pub fn std_id(&self) -> StandardId {
        self.id
    }

    /// The 11-bit identifier as a plain integer.
    pub fn raw_id(&self) -> u16 {
        self.id.as_raw()
    }

    /// Raw data length code (0..=15).
    pub fn dlc_code(&self) -> u8 {
        self.dlc
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame carries no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the data phase uses the switched bit rate.
    pub fn bit_rate_switch(&self) -> bool {
        self.brs
    }

    /// Whether this is an FD-format frame.
    pub fn is_fd(&self) -> bool {
        self.fd
    }
}

impl Frame for FdFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Standard(id) => FdFrame::new(id, data).ok(),
            Id::Extended(_) => None,
        }
    }

    /// Remote frames are filtered out at the bus; they cannot be built either.
    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        false
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        Id::Standard(self.id)
    }

    fn dlc(&self) -> usize {
        self.data.len()
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_can::ExtendedId;

    fn id(raw: u16) -> StandardId {
        StandardId::new(raw).unwrap()
    }

    #[test]
    fn test_dlc_table() {
        for len in 0..=8 {
            assert_eq!(len_to_dlc(len), Some(len as u8));
            assert_eq!(dlc_to_len(len as u8), len);
        }
        assert_eq!(len_to_dlc(24), Some(12));
        assert_eq!(len_to_dlc(32), Some(13));
        assert_eq!(len_to_dlc(48), Some(14));
        assert_eq!(len_to_dlc(64), Some(15));
        assert_eq!(len_to_dlc(40), None);
        assert_eq!(dlc_to_len(0x1f), 64);
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(40), Some(48));
        assert_eq!(padded_len(24), Some(24));
        assert_eq!(padded_len(9), Some(12));
        assert_eq!(padded_len(65), None);
    }

    #[test]
    fn test_new_pads_and_flags() {
        let frame = FdFrame::new(id(0x200), &[1u8; 40]).unwrap();
        assert_eq!(frame.len(), 48);
        assert_eq!(frame.dlc_code(), 14);
        assert!(frame.bit_rate_switch());
        assert!(frame.is_fd());
        assert!(frame.data()[..40].iter().all(|&b| b == 1));
        assert!(frame.data()[40..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_new_rejects_oversize() {
        assert_eq!(
            FdFrame::new(id(0x10), &[0u8; 65]),
            Err(FrameError::TooLong(65))
        );
    }

    #[test]
    fn test_from_received_respects_dlc() {
        let bytes = [7u8; 64];
        let frame = FdFrame::from_received(id(0x2ff), 8, false, true, &bytes);
        assert_eq!(frame.len(), 8);
        assert!(!frame.bit_rate_switch());

        let short = FdFrame::from_received(id(0x2ff), 15, true, true, &bytes[..10]);
        assert_eq!(short.len(), 10);
        assert_eq!(short.dlc_code(), 15);
    }

    #[test]
    fn test_embedded_can_frame() {
        let frame = <FdFrame as Frame>::new(id(0x123), &[1, 2, 3]).unwrap();
        assert_eq!(Frame::id(&frame), Id::Standard(id(0x123)));
        assert_eq!(Frame::dlc(&frame), 3);
        assert!(!frame.is_extended());
        assert!(!frame.is_remote_frame());

        let ext = ExtendedId::new(0x1234).unwrap();
        assert!(<FdFrame as Frame>::new(ext, &[]).is_none());
        assert!(<FdFrame as Frame>::new_remote(id(0x123), 0).is_none());
    }
}
