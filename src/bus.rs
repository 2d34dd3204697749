//! Hardware seam: what this layer needs from a CAN-FD controller driver.
//!
//! Implement [`FdCanBus`] on top of the HAL of the target chip (FDCAN on STM32H7, MCAN,
//! ...). Every method is called from either the main loop (setup, transmit) or the
//! receive interrupt (`rx_fill_level`, `receive`) and must not block.

use crate::frame::FdFrame;
use core::fmt::Debug;

/// Bus setup steps performed by [`Node::init`](crate::node::Node::init), in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    /// Installing the accept-all standard-identifier filter.
    Filter,
    /// Leaving configuration mode.
    Start,
    /// Enabling the new-frame receive interrupt.
    Interrupt,
}

/// A CAN-FD controller with one receive queue and one transmit queue.
pub trait FdCanBus {
    /// Driver-specific error.
    type Error: Debug;

    /// Routes every standard identifier into the receive queue and rejects remote frames.
    fn configure_rx(&mut self) -> Result<(), Self::Error>;

    /// Starts taking part in bus traffic.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Enables the interrupt that fires when a frame lands in the receive queue.
    fn enable_rx_interrupt(&mut self) -> Result<(), Self::Error>;

    /// Number of frames waiting in the receive queue.
    fn rx_fill_level(&mut self) -> usize;

    /// Pops the oldest frame of the receive queue.
    fn receive(&mut self) -> Result<FdFrame, Self::Error>;

    /// Queues a frame for transmission.
    ///
    /// # Returns
    /// - `Ok(())`: the frame is queued
    /// - `Err(nb::Error::WouldBlock)`: the transmit queue is full
    /// - `Err(nb::Error::Other(e))`: the controller refused the frame
    fn transmit(&mut self, frame: &FdFrame) -> nb::Result<(), Self::Error>;
}
