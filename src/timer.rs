/*
 * The 50 Hz frame tick. The interrupt handler bumps a saturating 8-bit
 * counter; the network code polls it for retransmission deadlines. A
 * single shared byte with relaxed ordering is all this needs, and on an
 * 8-bit bus the accesses are single instructions anyway.
 */
use core::sync::atomic::{AtomicU8, Ordering};

pub const TICKS_PER_SECOND: u8 = 50;

static TICKS: AtomicU8 = AtomicU8::new(0);

/// Called from the 50 Hz interrupt handler. Saturates at 255 rather than
/// wrapping so a stale deadline can never come back to life.
pub fn isr_tick() {
    let _ = TICKS.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |t| {
        if t == u8::MAX {
            None
        } else {
            Some(t + 1)
        }
    });
}

pub fn ticks() -> u8 {
    TICKS.load(Ordering::Relaxed)
}

/// Restart the counter, typically before arming a fresh deadline.
pub fn reset() {
    TICKS.store(0, Ordering::Relaxed);
}

/// A point in tick time to wait for.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: u8,
}

impl Deadline {
    pub fn after(ticks_from_now: u8) -> Self {
        Self {
            at: ticks().saturating_add(ticks_from_now),
        }
    }

    pub fn expired(&self) -> bool {
        ticks() >= self.at
    }
}
