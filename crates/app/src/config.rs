//! Configuration for the puff command-line tool.
//!
//! Handles parsing command-line arguments into an encode or decode run.
//! Defaults are chosen so the tool works with just a command and file
//! paths; the seed defaults to the current time and is printed only on
//! request, so runs are reproducible when `--seed` is given.

use std::path::PathBuf;

/// Which operation to run, with its file arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `encode <input> <keyfile>`: writes `<input>.puf`
    Encode { input: PathBuf, keyfile: PathBuf },

    /// `decode <input> <output> <keyfile>`
    Decode {
        input: PathBuf,
        output: PathBuf,
        keyfile: PathBuf,
    },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Operation and file paths
    pub mode: Mode,

    /// Symbol width in bits (1-7)
    pub width: u8,

    /// Seed for the weight tie-break randomness
    pub seed: u64,

    /// Chunk size in bytes
    pub chunk_bytes: usize,

    /// Whether to print a run summary
    pub print_stats: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// The first positional argument selects the mode; the remaining
    /// positionals are its file paths. Flags may appear anywhere.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut width: Option<u8> = None;
        let mut seed: Option<u64> = None;
        let mut chunk_bytes: Option<usize> = None;
        let mut print_stats = false;
        let mut positional: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--width" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--width requires a number".to_string());
                    }
                    let value: u8 = args[i].parse().map_err(|_| "invalid width")?;
                    if !(1..=7).contains(&value) {
                        return Err(format!("width must be 1-7, got {value}"));
                    }
                    width = Some(value);
                }
                "--seed" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--seed requires a number".to_string());
                    }
                    seed = Some(args[i].parse().map_err(|_| "invalid seed")?);
                }
                "--chunk-bytes" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--chunk-bytes requires a number".to_string());
                    }
                    let value: usize = args[i].parse().map_err(|_| "invalid chunk-bytes")?;
                    if value == 0 {
                        return Err("chunk-bytes must be positive".to_string());
                    }
                    chunk_bytes = Some(value);
                }
                "--stats" => {
                    print_stats = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown argument: {other}"));
                }
                other => {
                    positional.push(other.to_string());
                }
            }
            i += 1;
        }

        let mode = match positional.first().map(String::as_str) {
            Some("encode") => {
                if positional.len() != 3 {
                    return Err("encode requires <input> <keyfile>".to_string());
                }
                Mode::Encode {
                    input: PathBuf::from(&positional[1]),
                    keyfile: PathBuf::from(&positional[2]),
                }
            }
            Some("decode") => {
                if positional.len() != 4 {
                    return Err("decode requires <input> <output> <keyfile>".to_string());
                }
                Mode::Decode {
                    input: PathBuf::from(&positional[1]),
                    output: PathBuf::from(&positional[2]),
                    keyfile: PathBuf::from(&positional[3]),
                }
            }
            Some(other) => return Err(format!("unknown command: {other}")),
            None => return Err("no command given".to_string()),
        };

        // Time-based seed unless one was given explicitly
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis() as u64
        });

        Ok(Config {
            mode,
            width: width.unwrap_or(7),
            seed,
            chunk_bytes: chunk_bytes.unwrap_or(65536),
            print_stats,
        })
    }
}

fn print_help() {
    println!("puff: Huffman-based file obfuscation");
    println!();
    println!("USAGE:");
    println!("    puff encode <input> <keyfile>            Write <input>.puf");
    println!("    puff decode <input> <output> <keyfile>   Recover plaintext");
    println!();
    println!("OPTIONS:");
    println!("    --width <1-7>       Symbol width in bits (default: 7)");
    println!("    --seed <N>          Random seed for deterministic output");
    println!("    --chunk-bytes <N>   Chunk size (default: 65536)");
    println!("    --stats             Print a run summary");
    println!("    --help, -h          Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    puff encode notes.txt key.bin");
    println!("    puff decode notes.txt.puf notes.txt key.bin");
    println!("    puff encode notes.txt key.bin --width 5 --seed 42 --stats");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_encode() {
        let config = Config::from_args(&args(&["encode", "in.txt", "key.bin"])).unwrap();
        assert_eq!(
            config.mode,
            Mode::Encode {
                input: PathBuf::from("in.txt"),
                keyfile: PathBuf::from("key.bin"),
            }
        );
        assert_eq!(config.width, 7);
        assert_eq!(config.chunk_bytes, 65536);
    }

    #[test]
    fn test_parse_decode_with_flags() {
        let config = Config::from_args(&args(&[
            "decode", "in.puf", "out.txt", "key.bin", "--width", "3", "--seed", "9",
            "--chunk-bytes", "1024", "--stats",
        ]))
        .unwrap();
        assert!(matches!(config.mode, Mode::Decode { .. }));
        assert_eq!(config.width, 3);
        assert_eq!(config.seed, 9);
        assert_eq!(config.chunk_bytes, 1024);
        assert!(config.print_stats);
    }

    #[test]
    fn test_rejects_bad_width() {
        assert!(Config::from_args(&args(&["encode", "a", "k", "--width", "0"])).is_err());
        assert!(Config::from_args(&args(&["encode", "a", "k", "--width", "8"])).is_err());
    }

    #[test]
    fn test_rejects_missing_paths() {
        assert!(Config::from_args(&args(&["encode", "a"])).is_err());
        assert!(Config::from_args(&args(&["decode", "a", "b"])).is_err());
        assert!(Config::from_args(&args(&[])).is_err());
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Config::from_args(&args(&["encode", "a", "k", "--bogus"])).is_err());
    }
}
