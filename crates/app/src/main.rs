//! puff: command-line front end for the puff-core codec.
//!
//! Thin I/O wrapper: parses arguments, loads the key blob, reads the
//! input in full, and hands everything to the chunked codec. Exit codes:
//! 0 success (including a reported checksum mismatch), 1 fatal codec or
//! I/O error, 2 usage error, 3 unusable key file.

mod config;
mod key;

use config::{Config, Mode};
use puff_core::codec::{DecodeOptions, Decoder, EncodeOptions, Encoder};
use puff_core::stats::CodecStats;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("run `puff --help` for usage");
            process::exit(2);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(config: &Config) -> puff_core::Result<()> {
    match &config.mode {
        Mode::Encode { input, keyfile } => encode(config, input, keyfile),
        Mode::Decode {
            input,
            output,
            keyfile,
        } => decode(config, input, output, keyfile),
    }
}

fn encode(config: &Config, input_path: &Path, keyfile: &Path) -> puff_core::Result<()> {
    let key = load_key_or_exit(keyfile);
    let input = fs::read(input_path)?;

    let output_path = PathBuf::from(format!("{}.puf", input_path.display()));
    println!("encoding with {} bit symbols", config.width);

    let mut stats = CodecStats::new();
    let mut writer = BufWriter::new(File::create(&output_path)?);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut encoder = Encoder::new(EncodeOptions {
        width: config.width,
        chunk_bytes: config.chunk_bytes,
    })?;

    let report = encoder.encode(&input, &key, &mut writer, &mut rng)?;
    writer.flush()?;

    println!("wrote {}", output_path.display());
    if config.print_stats {
        stats.finish_encode(&report);
        stats.print_summary();
    }
    Ok(())
}

fn decode(
    config: &Config,
    input_path: &Path,
    output_path: &Path,
    keyfile: &Path,
) -> puff_core::Result<()> {
    let key = load_key_or_exit(keyfile);
    let container = fs::read(input_path)?;

    let mut stats = CodecStats::new();
    let mut writer = BufWriter::new(File::create(output_path)?);
    let mut decoder = Decoder::new(DecodeOptions {
        chunk_bytes: config.chunk_bytes,
    })?;

    let report = decoder.decode(&container, &key, &mut writer)?;
    writer.flush()?;

    // Output is written either way; the checksum is the diagnostic.
    if report.checksum_ok() {
        println!("CRC match");
    } else {
        eprintln!("CRC mismatch - confirm encryption key");
    }

    println!("wrote {}", output_path.display());
    if config.print_stats {
        stats.finish_decode(&report, container.len() as u64);
        stats.print_summary();
    }
    Ok(())
}

fn load_key_or_exit(keyfile: &Path) -> Vec<u8> {
    match key::load_key(keyfile) {
        Ok(key) => key,
        Err(err) => {
            eprintln!("error: cannot read key file {}: {err}", keyfile.display());
            process::exit(3);
        }
    }
}
