//! Tick distribution between the periodic timer interrupt and the main loop.
//!
//! A hardware timer fires at a fixed rate (1 kHz by default) and calls
//! [`TickCounter::record`]; the main loop consumes what accumulated since its last poll.
//! Two consumption models are supported, selected per role by [`TickModel`]:
//!
//! | Model                   | Interrupt does       | `consume()` returns           |
//! |-------------------------|----------------------|-------------------------------|
//! | [`TickModel::Counting`] | increments the count | ticks since last poll (0..)   |
//! | [`TickModel::Pending`]  | sets a flag          | 0 or 1, missed ticks collapse |
//!
//! Consumption is destructive in both models.
//!
//! Helpers for picking the timer reload value:
//! - `auto_reload`: runtime reload calculator
//! - `const_auto_reload`: compile-time reload calculator
//!
//! Common settings for a 1 kHz tick:
//!
//! | TIMER CLOCK | PRESCALER | RELOAD |
//! |-------------|-----------|--------|
//! |     240 MHz |       240 |    999 |
//! |     200 MHz |       200 |    999 |
//! |     100 MHz |       100 |    999 |

use core::cell::Cell;
use core::convert::Infallible;
use core::fmt;
use critical_section::Mutex;

mod delay;

/// Default tick rate of the control loop.
pub const DEFAULT_TICK_HZ: u32 = 1_000;

/// How timer ticks are handed to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickModel {
    /// Every tick is counted; the main loop sees exactly how many elapsed.
    #[default]
    Counting,
    /// Ticks only raise a flag; several missed ticks read as one.
    Pending,
}

/// Computes the auto-reload value for an up-counting timer.
///
/// # Arguments
/// - `timer_clock_hz`: timer kernel clock in Hz
/// - `prescaler`: effective prescaler (register value + 1)
/// - `tick_hz`: desired interrupt rate
///
/// # Returns
/// - `Some(reload)` to write into the reload register
/// - `None` if any argument is zero or the tick rate is unreachable
pub fn auto_reload(timer_clock_hz: u32, prescaler: u32, tick_hz: u32) -> Option<u32> {
    const_auto_reload(timer_clock_hz, prescaler, tick_hz)
}

/// Compile-time reload calculator. See [`auto_reload`].
pub const fn const_auto_reload(timer_clock_hz: u32, prescaler: u32, tick_hz: u32) -> Option<u32> {
    if prescaler == 0 || tick_hz == 0 {
        return None;
    }
    let counts = timer_clock_hz / prescaler / tick_hz;
    if counts == 0 {
        None
    } else {
        Some(counts - 1)
    }
}

/// Tick handoff cell shared by the timer interrupt and the main loop.
///
/// Can be placed in a `static`; all access goes through a critical section.
pub struct TickCounter {
    count: Mutex<Cell<u32>>,
}

impl TickCounter {
    /// An empty counter.
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Records one timer tick. Call from the timer interrupt.
    ///
    /// The count saturates instead of wrapping, so a stalled main loop never
    /// sees the count restart from zero.
    pub fn record(&self, model: TickModel) {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            match model {
                TickModel::Counting => count.set(count.get().saturating_add(1)),
                TickModel::Pending => count.set(1),
            }
        });
    }

    /// Takes everything recorded since the last call and resets to zero.
    pub fn consume(&self) -> u32 {
        critical_section::with(|cs| self.count.borrow(cs).replace(0))
    }

    /// Reads the current count without consuming it.
    pub fn peek(&self) -> u32 {
        critical_section::with(|cs| self.count.borrow(cs).get())
    }

    /// Non-blocking consume.
    ///
    /// # Returns
    /// - `Ok(n)`: `n > 0` ticks were consumed
    /// - `Err(nb::Error::WouldBlock)`: nothing elapsed yet
    pub fn poll(&self) -> nb::Result<u32, Infallible> {
        match self.consume() {
            0 => Err(nb::Error::WouldBlock),
            n => Ok(n),
        }
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TickCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickCounter")
            .field("count", &self.peek())
            .finish()
    }
}
