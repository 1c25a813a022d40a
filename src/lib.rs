//! NOAA APT weather-satellite image decoder.
//!
//! Consumes a raw 16-bit little-endian PCM sample stream (already
//! demodulated to baseband) and produces two grayscale [`channel::Channel`]
//! images, one per APT video channel, via [`decoder::Decoder`].

pub mod channel;
pub mod config;
pub mod decoder;
pub mod dsp;
pub mod err;
pub mod line;
pub mod pgm;
pub mod ring;
pub mod sample_source;
pub mod sync;
