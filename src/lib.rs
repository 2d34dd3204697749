//! # fdpdo
//!
//! A portable, no_std synchronization layer for multi-motor controllers exchanging
//! fixed-layout process data objects (PDOs) over CAN-FD.
//!
//! One **hub** streams per-motor commands to up to 15 motors; each **satellite** streams
//! per-motor telemetry back. Both ends run the same [`Node`]:
//! - a receive interrupt drains the hardware queue and routes each frame by identifier into
//!   a fixed per-motor [`StateTable`](table::StateTable)
//! - a periodic timer interrupt paces the main control loop through a tick counter
//! - the main loop reads the table, stages outbound records and transmits them
//!
//! Shared state lives behind `critical-section` mutexes, so a `Node` can be a `static`
//! touched from interrupts and the main loop alike. The controller itself is abstracted by
//! the [`FdCanBus`](bus::FdCanBus) trait.
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` and enables `std::error::Error` on the error types |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `log`       | Uses `log` logging |
//!
//! ## Identifier layout
//!
//! | Range         | Direction           | Payload                 |
//! |---------------|---------------------|-------------------------|
//! | `0x200+i`     | satellite to hub    | 40-byte telemetry (48 on the wire) |
//! | `0x300+i`     | hub to satellite    | 24-byte command         |
//!
//! Both bases are configurable through [`RoleConfig::new`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fdpdo::{MotorIndex, Node, RoleConfig};
//!
//! static NODE: Node = Node::new();
//!
//! NODE.init(RoleConfig::satellite(), &mut can)?;
//! loop {
//!     if NODE.consume_tick() {
//!         let command = NODE.table().command.get(MotorIndex::FIRST);
//!         // drive the motor ...
//!         NODE.transmit_staged(&mut can);
//!     }
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Frames are always sent as FD frames with bit-rate switching
//! - Record encoding uses the target's native byte order; both ends must agree
//! - Only one receive interrupt and one timer interrupt may drive a given `Node`

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub use critical_section;
pub use embedded_can;
pub use heapless;

// Declared first so the other modules see its macros.
#[macro_use]
mod fmt;

pub mod bus;
pub mod config;
pub mod consts;
pub mod diag;
pub mod frame;
pub mod motor;
pub mod node;
pub mod pdo;
pub mod router;
pub mod table;
pub mod timer;
pub mod tx;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::{FdCanBus, InitStage};
pub use config::{Role, RoleConfig};
pub use frame::FdFrame;
pub use motor::MotorIndex;
pub use node::{InitError, Node, NodeError, RxCounters};
pub use pdo::{CommandRecord, Pdo, PdoKind, TelemetryRecord};
pub use timer::TickModel;
