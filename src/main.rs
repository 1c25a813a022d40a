//! NOAA APT image decoder CLI.

use std::fs::File;
use std::path::Path;

use log::error;

use apt_decode::channel::Channel;
use apt_decode::config::{self, Settings};
use apt_decode::decoder::Decoder;
use apt_decode::err;
use apt_decode::pgm;
use apt_decode::sample_source::SampleSource;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let settings = match config::parse_args() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    let level = if settings.verbose { log::Level::Info } else { log::Level::Warn };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("{}", e);
        return 1;
    }

    match decode_and_write(&settings) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

/// Runs the decode and any requested output writing. Returns `Ok(false)`
/// (not an `Err`) when decoding succeeded but a requested post-processing
/// step (telemetry detection for `-n`) failed on one or both channels, or
/// when the read loop itself hit a mid-chunk short read, per spec section 7:
/// neither prevents writing whatever lines were already completed, but the
/// process must still exit non-zero.
fn decode_and_write(settings: &Settings) -> err::Result<bool> {
    let mut decoder = Decoder::new(settings.rate)?;

    let mut ok = match &settings.input {
        Some(path) => {
            let mut file = File::open(path)?;
            run_to_completion(&mut decoder, &mut file)
        }
        None => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            run_to_completion(&mut decoder, &mut input)
        }
    };

    if let Some(path) = &settings.out_a {
        ok &= process_and_write(decoder.channel_a_mut(), path, settings.normalize)?;
    }
    if let Some(path) = &settings.out_b {
        ok &= process_and_write(decoder.channel_b_mut(), path, settings.normalize)?;
    }

    Ok(ok)
}

/// Runs the decoder's read loop, logging (rather than propagating) a
/// mid-chunk short read so the lines already completed still get written.
/// Returns `false` if the read loop failed this way, `true` on a clean EOF.
fn run_to_completion<S: SampleSource>(
    decoder: &mut Decoder,
    source: &mut S,
) -> bool {
    match decoder.run(source) {
        Ok(()) => true,
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

/// Optionally detects telemetry and normalizes `channel`, then writes it to
/// `path` regardless of whether normalization succeeded. Returns `false` if
/// normalization was requested and failed.
fn process_and_write(channel: &mut Channel, path: &Path, normalize: bool) -> err::Result<bool> {
    let mut ok = true;

    if normalize {
        if let Err(e) = channel.detect_telemetry().and_then(|()| channel.normalize()) {
            error!("{}", e);
            ok = false;
        }
    }

    let mut file = File::create(path)?;
    pgm::write_channel(&mut file, channel)?;

    Ok(ok)
}
