//! The synchronization node shared by the hub and the satellites.
//!
//! A [`Node`] holds everything both interrupts and the main loop touch: the role
//! configuration, the per-motor [`StateTable`], the [`DiagnosticSnapshot`], the receive
//! counters and the [`TickCounter`]. It is `const`-constructible and meant to live in a
//! `static`, shared by reference between interrupt handlers and the main loop.
//!
//! ## Execution contexts
//!
//! | Method                     | Context                 |
//! |----------------------------|-------------------------|
//! | [`Node::init`]             | main, before interrupts |
//! | [`Node::on_frame_received`]| receive interrupt       |
//! | [`Node::on_tick`]          | timer interrupt         |
//! | everything else            | main loop               |
//!
//! The interrupt handlers run to completion and are not reentrant: each must be bound to
//! exactly one interrupt vector.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fdpdo::{Node, RoleConfig};
//!
//! static NODE: Node = Node::new();
//!
//! #[interrupt]
//! fn FDCAN1_IT0() {
//!     NODE.on_frame_received(unsafe { CAN.as_mut() });
//! }
//!
//! #[interrupt]
//! fn TIM6_DAC() {
//!     NODE.on_tick();
//! }
//!
//! fn main() -> ! {
//!     NODE.init(RoleConfig::hub(), &mut can).unwrap();
//!     loop {
//!         NODE.wait_for_tick(&mut delay, 20);
//!         let status = NODE.table().telemetry.snapshot();
//!         // control law ...
//!         NODE.transmit_staged(&mut can);
//!     }
//! }
//! ```

use crate::bus::{FdCanBus, InitStage};
use crate::config::RoleConfig;
use crate::diag::DiagnosticSnapshot;
use crate::frame::{FdFrame, FrameError};
use crate::motor::MotorIndex;
use crate::pdo::{CommandRecord, Pdo, PdoKind, TelemetryRecord};
use crate::router::{Route, Router};
use crate::table::{Slots, StateTable};
use crate::timer::{TickCounter, TickModel};
use crate::tx;
use core::cell::Cell;
use core::convert::Infallible;
use core::fmt;
use critical_section::{CriticalSection, Mutex};
use embedded_can::StandardId;
use embedded_hal::delay::DelayNs;
use thiserror::Error;

/// Bus setup failed during [`Node::init`].
#[derive(Debug, Error)]
#[error("CAN-FD bus setup failed at stage {stage:?}")]
pub struct InitError<E> {
    /// The step that failed.
    pub stage: InitStage,
    /// The driver's error.
    pub error: E,
}

/// Misuse of the main-loop API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    /// [`Node::init`] has not completed.
    #[error("node is not initialised")]
    Uninitialized,
    /// The record type is owned by the receive drain on this node.
    #[error("{} records are owned by the receive drain on this node", .0.as_str())]
    NotLocal(PdoKind),
}

/// Receive statistics. Monotonic (wrapping at `u32::MAX`), never reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxCounters {
    /// Every frame drained from the hardware.
    pub total: u32,
    /// Frames written into the owned table.
    pub matched: u32,
    /// Frames that went to the diagnostic snapshot.
    pub other: u32,
}

/// One end of the PDO link.
pub struct Node {
    config: Mutex<Cell<Option<RoleConfig>>>,
    table: StateTable,
    diagnostic: DiagnosticSnapshot,
    counters: Mutex<Cell<RxCounters>>,
    ticks: TickCounter,
}

impl Node {
    /// An uninitialised node with a zeroed table.
    pub const fn new() -> Self {
        Self {
            config: Mutex::new(Cell::new(None)),
            table: StateTable::new(),
            diagnostic: DiagnosticSnapshot::new(),
            counters: Mutex::new(Cell::new(RxCounters {
                total: 0,
                matched: 0,
                other: 0,
            })),
            ticks: TickCounter::new(),
        }
    }

    /// Applies `config` and brings the bus up: accept-all filter, start, receive interrupt.
    ///
    /// Call once from the main loop before the receive interrupt is unmasked. Calling it
    /// again re-applies the bus setup with the new configuration; table contents persist.
    ///
    /// # Errors
    /// [`InitError`] naming the failed step. The node is left uninitialised.
    pub fn init<B: FdCanBus>(
        &self,
        config: RoleConfig,
        bus: &mut B,
    ) -> Result<(), InitError<B::Error>> {
        self.set_config(Some(config));
        let result = Self::bring_up(bus);
        if let Err(ref e) = result {
            warn!("bus setup failed at {}", e.stage as u8);
            self.set_config(None);
            return result;
        }
        info!(
            "{} node up: telemetry base {}, command base {}",
            config.role().as_str(),
            config.telemetry_base(),
            config.command_base(),
        );
        Ok(())
    }

    fn bring_up<B: FdCanBus>(bus: &mut B) -> Result<(), InitError<B::Error>> {
        bus.configure_rx().map_err(|error| InitError {
            stage: InitStage::Filter,
            error,
        })?;
        bus.start().map_err(|error| InitError {
            stage: InitStage::Start,
            error,
        })?;
        bus.enable_rx_interrupt().map_err(|error| InitError {
            stage: InitStage::Interrupt,
            error,
        })
    }

    fn set_config(&self, config: Option<RoleConfig>) {
        critical_section::with(|cs| self.config.borrow(cs).set(config));
    }

    /// The active configuration, if initialised.
    pub fn config(&self) -> Option<RoleConfig> {
        critical_section::with(|cs| self.config.borrow(cs).get())
    }

    /// Receive interrupt handler: drains the hardware receive queue completely.
    ///
    /// Each frame is routed into the owned table, or into the diagnostic snapshot when the
    /// identifier is not in the inbound range or the payload is too short for the record.
    /// A hardware read error ends the drain at once; the next activation resumes.
    ///
    /// Does nothing before [`Node::init`].
    pub fn on_frame_received<B: FdCanBus>(&self, bus: &mut B) {
        let Some(config) = self.config() else {
            return;
        };
        let router = Router::new(&config);
        while bus.rx_fill_level() > 0 {
            let frame = match bus.receive() {
                Ok(frame) => frame,
                Err(_) => {
                    warn!("rx read failed, drain abandoned");
                    return;
                }
            };
            critical_section::with(|cs| self.dispatch(cs, &router, frame));
        }
    }

    fn dispatch(&self, cs: CriticalSection<'_>, router: &Router, frame: FdFrame) {
        let counters = self.counters.borrow(cs);
        let mut count = counters.get();
        count.total = count.total.wrapping_add(1);

        let id = frame.std_id();
        let stored = match router.classify(id) {
            Route::Inbound {
                kind: PdoKind::Telemetry,
                ..
            } => ingest(&self.table.telemetry, cs, router, id, frame.data()),
            Route::Inbound {
                kind: PdoKind::Command,
                ..
            } => ingest(&self.table.command, cs, router, id, frame.data()),
            Route::Unrecognized => Err(None),
        };

        match stored {
            Ok(_) => count.matched = count.matched.wrapping_add(1),
            Err(reason) => {
                if let Some(FrameError::Truncated { actual, .. }) = reason {
                    debug!("frame {} too short ({} bytes)", frame.raw_id(), actual);
                }
                count.other = count.other.wrapping_add(1);
                self.diagnostic.capture(cs, frame);
            }
        }
        counters.set(count);
    }

    fn tick_model(&self) -> TickModel {
        self.config()
            .map(|config| config.tick_model())
            .unwrap_or(TickModel::Counting)
    }

    /// Collapses counts accumulated before init under the pending model.
    fn clamp_ticks(&self, ticks: u32) -> u32 {
        match self.tick_model() {
            TickModel::Counting => ticks,
            TickModel::Pending => ticks.min(1),
        }
    }

    /// Timer interrupt handler: records one tick using the configured model.
    ///
    /// Before [`Node::init`] ticks are counted.
    pub fn on_tick(&self) {
        self.ticks.record(self.tick_model());
    }

    /// Takes the ticks recorded since the last call.
    ///
    /// # Returns
    /// - counting model: the number of ticks elapsed (may exceed 1 if the loop fell behind)
    /// - pending model: 1 if at least one tick elapsed, else 0
    pub fn consume_ticks(&self) -> u32 {
        self.clamp_ticks(self.ticks.consume())
    }

    /// Takes the ticks recorded since the last call, reporting only whether any occurred.
    pub fn consume_tick(&self) -> bool {
        self.consume_ticks() > 0
    }

    /// Whether a tick is waiting, without consuming it.
    pub fn tick_pending(&self) -> bool {
        self.ticks.peek() > 0
    }

    /// Non-blocking tick consume. See [`TickCounter::poll`].
    pub fn poll_ticks(&self) -> nb::Result<u32, Infallible> {
        self.ticks.poll().map(|ticks| self.clamp_ticks(ticks))
    }

    /// Blocks the main loop until the next tick. See [`TickCounter::wait`].
    pub fn wait_for_tick<D: DelayNs>(&self, delay: &mut D, poll_us: u32) -> u32 {
        let ticks = self.ticks.wait(delay, poll_us);
        self.clamp_ticks(ticks)
    }

    /// The per-motor table, for reading.
    pub fn table(&self) -> &StateTable {
        &self.table
    }

    /// Current receive counters.
    pub fn counters(&self) -> RxCounters {
        critical_section::with(|cs| self.counters.borrow(cs).get())
    }

    /// Whether an unrecognized frame is waiting.
    pub fn diagnostic_pending(&self) -> bool {
        self.diagnostic.is_pending()
    }

    /// Takes the last unrecognized frame, clearing the pending state.
    pub fn take_diagnostic(&self) -> Option<FdFrame> {
        self.diagnostic.take()
    }

    /// Writes a command into the local table, forcing its motor index to `index`.
    ///
    /// # Errors
    /// - [`NodeError::Uninitialized`] before [`Node::init`]
    /// - [`NodeError::NotLocal`] on a satellite, where commands are owned by the drain
    pub fn stage_command(&self, index: MotorIndex, record: CommandRecord) -> Result<(), NodeError> {
        self.stage(&self.table.command, index, record)
    }

    /// Writes telemetry into the local table, forcing its motor index to `index`.
    ///
    /// # Errors
    /// - [`NodeError::Uninitialized`] before [`Node::init`]
    /// - [`NodeError::NotLocal`] on a hub, where telemetry is owned by the drain
    pub fn stage_telemetry(
        &self,
        index: MotorIndex,
        record: TelemetryRecord,
    ) -> Result<(), NodeError> {
        self.stage(&self.table.telemetry, index, record)
    }

    fn stage<P: Pdo>(
        &self,
        slots: &Slots<P>,
        index: MotorIndex,
        mut record: P,
    ) -> Result<(), NodeError> {
        let config = self.config().ok_or(NodeError::Uninitialized)?;
        if config.role().outbound() != P::KIND {
            return Err(NodeError::NotLocal(P::KIND));
        }
        record.set_motor_id(index.as_u32());
        critical_section::with(|cs| slots.store(cs, index, record));
        Ok(())
    }

    /// Sends every slot of the local table, in slot order.
    ///
    /// Stops at the first frame the bus does not accept.
    ///
    /// # Returns
    /// The number of frames queued (15 when everything went out, 0 before init).
    pub fn transmit_staged<B: FdCanBus>(&self, bus: &mut B) -> usize {
        let Some(config) = self.config() else {
            return 0;
        };
        let base = config.base(config.role().outbound());
        match config.role().outbound() {
            PdoKind::Command => send_all(bus, base, &self.table.command),
            PdoKind::Telemetry => send_all(bus, base, &self.table.telemetry),
        }
    }

    /// Sends one command frame on `command base + index`.
    ///
    /// # Returns
    /// `false` before init, or if the bus did not accept the frame.
    pub fn send_command<B: FdCanBus>(
        &self,
        bus: &mut B,
        index: MotorIndex,
        record: &CommandRecord,
    ) -> bool {
        self.config()
            .and_then(|config| tx::command_frame(&config, index, record).ok())
            .is_some_and(|frame| tx::enqueue(bus, &frame))
    }

    /// Sends one telemetry frame on `telemetry base + index`.
    ///
    /// # Returns
    /// `false` before init, or if the bus did not accept the frame.
    pub fn send_telemetry<B: FdCanBus>(
        &self,
        bus: &mut B,
        index: MotorIndex,
        record: &TelemetryRecord,
    ) -> bool {
        self.config()
            .and_then(|config| tx::telemetry_frame(&config, index, record).ok())
            .is_some_and(|frame| tx::enqueue(bus, &frame))
    }

    /// Sends a 32-byte all-zero keepalive on `raw_id`.
    ///
    /// Works regardless of configuration state.
    pub fn send_keepalive<B: FdCanBus>(&self, bus: &mut B, raw_id: u16) -> bool {
        tx::keepalive_frame(raw_id).is_ok_and(|frame| tx::enqueue(bus, &frame))
    }
}

fn ingest<P: Pdo>(
    slots: &Slots<P>,
    cs: CriticalSection<'_>,
    router: &Router,
    id: StandardId,
    payload: &[u8],
) -> Result<MotorIndex, Option<FrameError>> {
    let record = P::decode(payload).map_err(Some)?;
    match router.route(id, Some(record.motor_id())) {
        Route::Inbound { slot, .. } => {
            slots.store(cs, slot, record);
            Ok(slot)
        }
        Route::Unrecognized => Err(None),
    }
}

fn send_all<B: FdCanBus, P: Pdo>(bus: &mut B, base: u16, slots: &Slots<P>) -> usize {
    let mut sent = 0;
    for (index, record) in MotorIndex::all().zip(slots.snapshot()) {
        let queued =
            tx::pdo_frame(base, index, &record).is_ok_and(|frame| tx::enqueue(bus, &frame));
        if !queued {
            break;
        }
        sent += 1;
    }
    sent
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("config", &self.config())
            .field("counters", &self.counters())
            .field("diagnostic", &self.diagnostic)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}
