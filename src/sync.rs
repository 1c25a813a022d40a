//! Sync pulse matched filter and lock tracking.

use crate::dsp::SYNC_PULSE_FREQ;
use crate::ring::RingBuffer;

/// Moving-window matched filter that locates the 1040Hz sync pulse train.
///
/// Holds the sample-rate-derived geometry of a single sync pulse and of the
/// full 7-cycle sync train; both are fixed for the lifetime of a decoder.
pub struct SyncDetector {
    sr: u32,

    /// Samples per 1040Hz half-cycle (one pulse of the reference tone).
    pub sync_pulse: u32,

    /// Samples in the full 7-cycle sync train.
    pub sync_window: u32,
}

impl SyncDetector {
    pub fn new(sr: u32) -> Self {
        SyncDetector {
            sr,
            sync_pulse: sr / SYNC_PULSE_FREQ,
            sync_window: 7 * sr / SYNC_PULSE_FREQ,
        }
    }

    /// Searches `[pos, pos + search_length)` for the position with the
    /// highest matched-filter response against a 7-cycle 1040Hz square wave.
    ///
    /// Returns the winning position advanced past the tail of the sync
    /// train, and the (normalized) response value at that position. Ties
    /// keep the first position found.
    pub fn find(
        &self,
        ampl: &RingBuffer<u16>,
        msum: &RingBuffer<u32>,
        pos: u32,
        search_length: u32,
    ) -> (u32, i32) {
        let mut max_pos = pos;
        let mut max_response = i32::MIN;

        for p in pos..pos.wrapping_add(search_length) {
            let avg = (msum.get(p) / self.sync_window) as i64;
            let sync_base = p.wrapping_sub(self.sync_window).wrapping_sub(1);

            let mut response: i64 = 0;
            for j in 0..7u32 {
                let sync_pos = sync_base.wrapping_add(j * self.sr / SYNC_PULSE_FREQ);

                let mut k = 0u32;
                while k < self.sync_pulse / 2 {
                    response += ampl.get(sync_pos.wrapping_add(k)) as i64 - avg;
                    k += 1;
                }
                if self.sync_pulse & 1 != 0 {
                    k += 1;
                }
                while k < self.sync_pulse {
                    response -= ampl.get(sync_pos.wrapping_add(k)) as i64 - avg;
                    k += 1;
                }
            }

            let response = (response / (14 * (self.sync_pulse & !1) as i64)) as i32;
            if response > max_response {
                max_response = response;
                max_pos = p;
            }
        }

        let advanced = max_pos.wrapping_add(7 * self.sr / crate::dsp::WORD_FREQ);
        (advanced, max_response)
    }
}

/// Outcome of feeding one new sync response into the [`LockTracker`].
#[derive(Debug, PartialEq, Eq)]
pub enum LockTransition {
    /// Lock state unchanged.
    None,
    /// Transitioned from unlocked to locked.
    Acquired,
    /// Transitioned from locked to unlocked.
    Lost,
}

/// Tracks signal lock from the rolling standard deviation of the last 16
/// sync detector responses.
///
/// Hysteresis: acquires lock when `dev < 50`, loses it when `dev > 200`.
/// Starts unlocked, with its response history initialized to zero - so the
/// first 16 iterations include zero samples in the standard deviation and
/// lock can never acquire inside them. Preserved intentionally.
pub struct LockTracker {
    history: [i64; 16],
    index: usize,
    sum: i64,
    sq_sum: i64,
    locked: bool,
}

impl LockTracker {
    pub fn new() -> Self {
        LockTracker { history: [0; 16], index: 0, sum: 0, sq_sum: 0, locked: false }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Folds in a new detector response and updates the lock flag.
    pub fn update(&mut self, response: i32) -> LockTransition {
        let response = response as i64;
        let old = self.history[self.index];
        self.sum += response - old;
        self.sq_sum += response * response - old * old;
        self.history[self.index] = response;
        self.index = (self.index + 1) & 0xf;

        let dev = (((self.sq_sum - (self.sum * self.sum) / 16) / 16) as f64)
            .max(0.0)
            .sqrt()
            .floor() as i64;

        if !self.locked && dev < 50 {
            self.locked = true;
            LockTransition::Acquired
        } else if self.locked && dev > 200 {
            self.locked = false;
            LockTransition::Lost
        } else {
            LockTransition::None
        }
    }
}
