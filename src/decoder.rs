//! The outer state machine: fills buffers, runs the sync detector, drives
//! lock tracking, and dispatches completed lines to each channel.

use log::info;

use crate::channel::Channel;
use crate::dsp::{self, AmplitudeEstimator, CHANNEL_WORDS, SYNC_WORDS, WORD_FREQ};
use crate::err;
use crate::line::sample_line;
use crate::ring::{self, RingBuffer};
use crate::sample_source::{FillOutcome, SampleSource};
use crate::sync::{LockTracker, LockTransition, SyncDetector};

/// Decodes one APT image from a raw sample stream.
///
/// Owns the three rings (raw samples, envelope, moving sum) and the two
/// channel stores. Construct once per stream with [`Decoder::new`], then
/// drive it to completion with [`Decoder::run`] (or step it manually with
/// [`Decoder::step`], e.g. for tests that want to inspect intermediate
/// state).
pub struct Decoder {
    sr: u32,

    raw: RingBuffer<i16>,
    ampl: RingBuffer<u16>,
    msum: RingBuffer<u32>,

    estimator: AmplitudeEstimator,
    sync: SyncDetector,
    lock: LockTracker,

    /// One past the highest raw-sample index currently valid in the rings.
    npos: u32,
    /// Current scheduler read position.
    pos: u32,
    /// Sync search window for the *next* detector call; recomputed after
    /// every lock-tracker update from the now-current lock state.
    search_limit: u32,

    channel_a: Channel,
    channel_b: Channel,
}

impl Decoder {
    /// Constructs a decoder for a stream sampled at `sample_rate` Hz.
    /// Rejects 0 and any rate that evenly divides 4800Hz (see
    /// [`dsp::validate_sample_rate`]).
    pub fn new(sample_rate: u32) -> err::Result<Self> {
        let estimator = AmplitudeEstimator::new(sample_rate)?;
        let sync = SyncDetector::new(sample_rate);

        let len = ring::next_pow2(sample_rate.max(1));

        Ok(Decoder {
            sr: sample_rate,
            raw: RingBuffer::new(len),
            ampl: RingBuffer::new(len),
            msum: RingBuffer::new(len),
            estimator,
            sync,
            lock: LockTracker::new(),
            npos: 0,
            pos: 0,
            // Initial lock state is unlocked, so the first search uses the
            // unlocked (one scan line's worth of samples) window.
            search_limit: 2 * (SYNC_WORDS + CHANNEL_WORDS) * sample_rate / WORD_FREQ,
            channel_a: Channel::new(),
            channel_b: Channel::new(),
        })
    }

    pub fn channel_a(&self) -> &Channel {
        &self.channel_a
    }

    pub fn channel_b(&self) -> &Channel {
        &self.channel_b
    }

    pub fn channel_a_mut(&mut self) -> &mut Channel {
        &mut self.channel_a
    }

    pub fn channel_b_mut(&mut self) -> &mut Channel {
        &mut self.channel_b
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Runs the scheduler to completion: repeatedly calls [`Decoder::step`]
    /// until the stream reports a clean EOF.
    pub fn run<S: SampleSource>(&mut self, source: &mut S) -> err::Result<()> {
        while self.step(source)? {}
        Ok(())
    }

    /// Runs one scheduler iteration: fills input, locates the next sync
    /// train, appends one line to each channel. Returns `false` on clean
    /// EOF, at which point the caller should stop.
    pub fn step<S: SampleSource>(&mut self, source: &mut S) -> err::Result<bool> {
        if !self.fill_input(source)? {
            return Ok(false);
        }

        let (detect_pos, response) = self.sync.find(&self.ampl, &self.msum, self.pos, self.search_limit);

        match self.lock.update(response) {
            LockTransition::Acquired => info!("{}: Acquired lock", timestamp(self.pos, self.sr)),
            LockTransition::Lost => info!("{}: Lost lock", timestamp(self.pos, self.sr)),
            LockTransition::None => {}
        }

        self.search_limit = if self.lock.is_locked() {
            SYNC_WORDS * self.sr / WORD_FREQ
        } else {
            2 * (SYNC_WORDS + CHANNEL_WORDS) * self.sr / WORD_FREQ
        };

        self.pos = detect_pos;

        let line_a = sample_line(&self.ampl, self.sr, self.pos);
        self.channel_a.push_line(&line_a);
        self.pos = self.pos.wrapping_add((CHANNEL_WORDS + SYNC_WORDS) * self.sr / WORD_FREQ);

        let line_b = sample_line(&self.ampl, self.sr, self.pos);
        self.channel_b.push_line(&line_b);
        self.pos = self.pos.wrapping_add(CHANNEL_WORDS * self.sr / WORD_FREQ);

        Ok(true)
    }

    /// Reads as many new raw samples as fit while preserving
    /// `npos - pos <= len - sync_window`, and extends the envelope and
    /// moving-sum rings to cover them. Returns `false` on clean EOF.
    fn fill_input<S: SampleSource>(&mut self, source: &mut S) -> err::Result<bool> {
        let len = self.raw.len();
        let sync_window = self.sync.sync_window;

        let used = self.npos.wrapping_sub(self.pos);
        let free = len - used;
        if free <= sync_window {
            // Already enough buffered ahead of `pos`; nothing to read yet.
            return Ok(true);
        }
        let n = free - sync_window;

        let mut buf = vec![0i16; n as usize];
        if let FillOutcome::Eof = source.fill(&mut buf)? {
            return Ok(false);
        }
        self.raw.write_slice(self.npos, &buf);

        for i in 0..n {
            let idx = self.npos.wrapping_add(i);
            let prev = self.raw.get(idx.wrapping_sub(1));
            let cur = self.raw.get(idx);
            let amplitude = self.estimator.estimate(prev, cur);
            self.ampl.set(idx, amplitude);

            let prev_sum = self.msum.get(idx.wrapping_sub(1));
            let outgoing = self.ampl.get(idx.wrapping_sub(sync_window));
            self.msum.set(
                idx,
                prev_sum.wrapping_sub(u32::from(outgoing)).wrapping_add(u32::from(amplitude)),
            );
        }

        self.npos = self.npos.wrapping_add(n);
        Ok(true)
    }
}

/// Formats a sample position as `"[MM:SS.mmm]"`, per spec's progress-message
/// format.
fn timestamp(pos: u32, sr: u32) -> String {
    let seconds = f64::from(pos) / f64::from(sr);
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    format!("[{:02}:{:06.3}]", minutes as u64, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence(n_samples: usize) -> std::io::Cursor<Vec<u8>> {
        std::io::Cursor::new(vec![0u8; n_samples * 2])
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp(0, 11025), "[00:00.000]");
        assert_eq!(timestamp(11025 * 65, 11025), "[01:05.000]");
    }

    #[test]
    fn test_decoder_rejects_invalid_sample_rate() {
        assert!(Decoder::new(4800).is_err());
        assert!(Decoder::new(0).is_err());
        assert!(Decoder::new(9600).is_ok());
        assert!(Decoder::new(11025).is_ok());
    }

    #[test]
    fn test_silent_input_produces_equal_height_channels() {
        let sr = 11025;
        let mut decoder = Decoder::new(sr).unwrap();
        // A handful of scan lines' worth of silence.
        let mut source = silence(sr as usize * 3);
        decoder.run(&mut source).unwrap();

        assert_eq!(decoder.channel_a().height(), decoder.channel_b().height());
        assert!(decoder.channel_a().height() > 0);
        assert!(!decoder.is_locked());
    }

    #[test]
    fn test_line_append_atomicity_across_iterations() {
        let sr = 11025;
        let mut decoder = Decoder::new(sr).unwrap();
        let mut source = silence(sr as usize * 5);

        let mut prev_height = 0;
        while decoder.step(&mut source).unwrap() {
            assert_eq!(decoder.channel_a().height(), decoder.channel_b().height());
            assert_eq!(decoder.channel_a().height(), prev_height + 1);
            prev_height += 1;
        }
    }
}
