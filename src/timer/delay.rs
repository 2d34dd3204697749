use super::TickCounter;
use embedded_hal::delay::DelayNs;

impl TickCounter {
    /// Blocks until at least one tick has been recorded, then consumes.
    ///
    /// This is a simple pacing loop for the main loop of a node. Between polls it sleeps
    /// on a delay provider implementing `embedded_hal::delay::DelayNs`.
    ///
    /// # Arguments
    /// - `delay`: A delay provider, typically from the HAL.
    /// - `poll_us`: Sleep between polls, in microseconds. Keep it well below the tick period.
    ///
    /// # Returns
    /// The number of ticks consumed (always at least 1).
    ///
    /// # Notes
    /// - Never call this from interrupt context.
    /// - There is no timeout: if the timer interrupt is not running this never returns.
    pub fn wait<D: DelayNs>(&self, delay: &mut D, poll_us: u32) -> u32 {
        loop {
            match self.poll() {
                Ok(n) => return n,
                Err(_) => delay.delay_us(poll_us),
            }
        }
    }
}
