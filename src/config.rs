//! Command-line argument parsing.

use std::path::PathBuf;

use crate::dsp;
use crate::err;

/// Fully parsed command-line configuration.
#[derive(Debug)]
pub struct Settings {
    /// Sample rate of the input stream, in Hz.
    pub rate: u32,

    /// Input file path; `None` means read from standard input.
    pub input: Option<PathBuf>,

    /// Channel A output path, if requested.
    pub out_a: Option<PathBuf>,

    /// Channel B output path, if requested.
    pub out_b: Option<PathBuf>,

    /// Apply contrast normalization against the telemetry wedges before
    /// writing.
    pub normalize: bool,

    /// Print progress messages (lock acquired/lost) on standard error.
    pub verbose: bool,
}

/// Parses `std::env::args()` into a [`Settings`], validating the sample rate
/// up front (spec section 4.1) before any buffers are allocated.
pub fn parse_args() -> err::Result<Settings> {
    let mut rate: Option<i64> = None;
    let mut out_a: Option<String> = None;
    let mut out_b: Option<String> = None;
    let mut normalize = false;
    let mut verbose = false;
    let mut input: Option<String> = None;

    {
        let mut parser = argparse::ArgumentParser::new();
        parser.set_description(
            "Decode NOAA APT weather-satellite images from a raw 16-bit PCM \
            audio stream.");
        parser.refer(&mut rate)
            .add_option(&["-r"], argparse::StoreOption,
            "Sample rate of the input stream, in Hz. Required.")
            .metavar("RATE");
        parser.refer(&mut out_a)
            .add_option(&["-a"], argparse::StoreOption,
            "Write channel A image to PATH.")
            .metavar("PATH");
        parser.refer(&mut out_b)
            .add_option(&["-b"], argparse::StoreOption,
            "Write channel B image to PATH.")
            .metavar("PATH");
        parser.refer(&mut normalize)
            .add_option(&["-n"], argparse::StoreTrue,
            "Apply contrast normalization against the telemetry wedges \
            before writing.");
        parser.refer(&mut verbose)
            .add_option(&["-v"], argparse::StoreTrue,
            "Print progress messages (lock acquired/lost) on standard error.");
        parser.refer(&mut input)
            .add_argument("FILE", argparse::StoreOption,
            "Input file. Standard input if omitted.");

        if parser.parse_args().is_err() {
            return Err(err::Error::Config("invalid command-line arguments".to_string()));
        }
    }

    let rate = rate.ok_or_else(|| err::Error::Config("-r RATE is required".to_string()))?;
    if rate <= 0 || rate > i64::from(u32::MAX) {
        return Err(err::Error::Config("sample rate must be a positive integer".to_string()));
    }
    let rate = rate as u32;
    dsp::validate_sample_rate(rate)?;

    Ok(Settings {
        rate,
        input: input.map(PathBuf::from),
        out_a: out_a.map(PathBuf::from),
        out_b: out_b.map(PathBuf::from),
        normalize,
        verbose,
    })
}
