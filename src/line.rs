//! Word-rate resampling: turns a span of the envelope ring into one scan
//! line of pixel words.

use crate::dsp::{CHANNEL_WORDS, WORD_FREQ};
use crate::ring::RingBuffer;

/// Averages envelope samples into [`CHANNEL_WORDS`] pixel words starting at
/// `start`, at sample rate `sr`.
///
/// For word `i`, `s_i = start + i*sr/WORD_FREQ` and `e_i = start +
/// (i+1)*sr/WORD_FREQ`; the pixel is the integer mean of `ampl[s_i..e_i)`. No
/// interpolation: the rounding error per word is bounded by one sample
/// amplitude.
pub fn sample_line(ampl: &RingBuffer<u16>, sr: u32, start: u32) -> Vec<u16> {
    let mut line = Vec::with_capacity(CHANNEL_WORDS as usize);

    for i in 0..CHANNEL_WORDS {
        let s = start.wrapping_add(i * sr / WORD_FREQ);
        let e = start.wrapping_add((i + 1) * sr / WORD_FREQ);

        let mut sum: u32 = 0;
        let mut p = s;
        while p != e {
            sum += u32::from(ampl.get(p));
            p = p.wrapping_add(1);
        }

        line.push((sum / (e.wrapping_sub(s))) as u16);
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_line_uniform_envelope() {
        let mut ampl: RingBuffer<u16> = RingBuffer::new(16384);
        for i in 0..16384u32 {
            ampl.set(i, 4321);
        }
        let line = sample_line(&ampl, 11025, 100);
        assert_eq!(line.len(), CHANNEL_WORDS as usize);
        assert!(line.iter().all(|&p| p == 4321));
    }

    #[test]
    fn test_sample_line_length_is_channel_words() {
        let ampl: RingBuffer<u16> = RingBuffer::new(8192);
        let line = sample_line(&ampl, 9600, 0);
        assert_eq!(line.len(), 1001);
    }
}
