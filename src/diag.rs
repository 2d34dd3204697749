//! One-slot capture of the most recent unrecognized frame.
//!
//! Frames the router does not recognize are kept for debugging only. There is no queue: a
//! second unrecognized frame before the main loop takes the first simply replaces it.

use crate::frame::FdFrame;
use core::cell::RefCell;
use core::fmt;
use critical_section::{CriticalSection, Mutex};

/// The last unrecognized frame and its pending state.
pub struct DiagnosticSnapshot {
    frame: Mutex<RefCell<Option<FdFrame>>>,
}

impl DiagnosticSnapshot {
    /// Empty, nothing pending.
    pub const fn new() -> Self {
        Self {
            frame: Mutex::new(RefCell::new(None)),
        }
    }

    /// Replaces the snapshot and marks it pending.
    pub(crate) fn capture(&self, cs: CriticalSection<'_>, frame: FdFrame) {
        let _ = self.frame.borrow(cs).replace(Some(frame));
    }

    /// Whether a frame is waiting to be taken.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.frame.borrow(cs).borrow().is_some())
    }

    /// Takes the pending frame, clearing the pending state.
    pub fn take(&self) -> Option<FdFrame> {
        critical_section::with(|cs| self.frame.borrow(cs).take())
    }
}

impl Default for DiagnosticSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DiagnosticSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSnapshot")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_can::StandardId;

    fn frame(raw: u16, fill: u8) -> FdFrame {
        FdFrame::from_received(StandardId::new(raw).unwrap(), 8, true, true, &[fill; 8])
    }

    #[test]
    fn test_take_clears_pending() {
        let snapshot = DiagnosticSnapshot::new();
        assert!(!snapshot.is_pending());
        assert_eq!(snapshot.take(), None);

        critical_section::with(|cs| snapshot.capture(cs, frame(0x2ff, 1)));
        assert!(snapshot.is_pending());
        assert_eq!(snapshot.take(), Some(frame(0x2ff, 1)));
        assert!(!snapshot.is_pending());
        assert_eq!(snapshot.take(), None);
    }

    #[test]
    fn test_second_capture_overwrites() {
        let snapshot = DiagnosticSnapshot::new();
        critical_section::with(|cs| snapshot.capture(cs, frame(0x2ff, 1)));
        critical_section::with(|cs| snapshot.capture(cs, frame(0x123, 2)));
        assert_eq!(snapshot.take(), Some(frame(0x123, 2)));
        assert_eq!(snapshot.take(), None);
    }
}
