//! In-memory `FdCanBus` for unit tests.

use crate::bus::{FdCanBus, InitStage};
use crate::frame::FdFrame;
use embedded_can::StandardId;
use std::collections::VecDeque;
use std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

#[derive(Debug, Default)]
pub(crate) struct MockBus {
    /// Receive queue; an `Err` entry makes the next `receive` fail once.
    pub rx: VecDeque<Result<FdFrame, MockError>>,
    pub tx: Vec<FdFrame>,
    pub tx_capacity: usize,
    pub tx_error: bool,
    pub fail_at: Option<InitStage>,
    pub setup: Vec<InitStage>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::with_tx_capacity(64)
    }

    pub fn with_tx_capacity(tx_capacity: usize) -> Self {
        Self {
            tx_capacity,
            ..Self::default()
        }
    }

    pub fn push_rx(&mut self, frame: FdFrame) {
        self.rx.push_back(Ok(frame));
    }

    pub fn push_rx_error(&mut self) {
        self.rx.push_back(Err(MockError));
    }

    fn step(&mut self, stage: InitStage) -> Result<(), MockError> {
        self.setup.push(stage);
        if self.fail_at == Some(stage) {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

impl FdCanBus for MockBus {
    type Error = MockError;

    fn configure_rx(&mut self) -> Result<(), MockError> {
        self.step(InitStage::Filter)
    }

    fn start(&mut self) -> Result<(), MockError> {
        self.step(InitStage::Start)
    }

    fn enable_rx_interrupt(&mut self) -> Result<(), MockError> {
        self.step(InitStage::Interrupt)
    }

    fn rx_fill_level(&mut self) -> usize {
        self.rx.len()
    }

    fn receive(&mut self) -> Result<FdFrame, MockError> {
        self.rx.pop_front().unwrap_or(Err(MockError))
    }

    fn transmit(&mut self, frame: &FdFrame) -> nb::Result<(), MockError> {
        if self.tx_error {
            return Err(nb::Error::Other(MockError));
        }
        if self.tx.len() >= self.tx_capacity {
            return Err(nb::Error::WouldBlock);
        }
        self.tx.push(frame.clone());
        Ok(())
    }
}

/// A frame as the receive side would hand it over: full FD flags, exact DLC.
pub(crate) fn rx_frame(raw_id: u16, payload: &[u8]) -> FdFrame {
    let id = StandardId::new(raw_id).unwrap();
    let sent = FdFrame::new(id, payload).unwrap();
    FdFrame::from_received(id, sent.dlc_code(), true, true, sent.data())
}
