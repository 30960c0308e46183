//! Run statistics and reporting for the codec.
//!
//! Collects byte counts, chunk activity, and timing for one encode or
//! decode run, and prints a human-readable summary. Populated from the
//! codec's reports by the caller; the core never prints on its own.
//!
//! Single-threaded by design, like the codec itself.

use crate::codec::{DecodeReport, EncodeReport};
use std::time::{Duration, Instant};

/// Statistics for a single codec run.
#[derive(Debug, Clone)]
pub struct CodecStats {
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    /// Plaintext bytes (input on encode, output on decode)
    pub plain_bytes: u64,

    /// Container bytes (output on encode, input on decode)
    pub container_bytes: u64,

    /// Chunks processed
    pub chunks: u64,

    /// Chunk attempts retried after allocation backoff
    pub retries: u64,

    /// Whether the plaintext checksum matched (decode only)
    pub checksum_ok: Option<bool>,
}

impl CodecStats {
    /// Create stats with the start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            plain_bytes: 0,
            container_bytes: 0,
            chunks: 0,
            retries: 0,
            checksum_ok: None,
        }
    }

    /// Absorb an encode report and mark the run complete.
    pub fn finish_encode(&mut self, report: &EncodeReport) {
        self.plain_bytes = report.input_bytes;
        self.container_bytes = report.container_bytes;
        self.chunks = report.chunks;
        self.retries = report.retries;
        self.end_time = Some(Instant::now());
    }

    /// Absorb a decode report and mark the run complete.
    pub fn finish_decode(&mut self, report: &DecodeReport, container_bytes: u64) {
        self.plain_bytes = report.output_bytes;
        self.container_bytes = container_bytes;
        self.chunks = report.chunks;
        self.retries = report.retries;
        self.checksum_ok = Some(report.checksum_ok());
        self.end_time = Some(Instant::now());
    }

    /// Total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Container size relative to plaintext size.
    ///
    /// Above 1.0 the "compression" expanded the data, which is common for
    /// small inputs once the table region is accounted for.
    pub fn size_ratio(&self) -> f64 {
        if self.plain_bytes == 0 {
            0.0
        } else {
            self.container_bytes as f64 / self.plain_bytes as f64
        }
    }

    /// Plaintext throughput in bytes/second.
    pub fn throughput_bps(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.plain_bytes as f64 / secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Plaintext: {} bytes", self.plain_bytes);
        println!("Container: {} bytes", self.container_bytes);
        println!("Size ratio: {:.1}%", self.size_ratio() * 100.0);
        println!("Chunks: {}", self.chunks);
        if self.retries > 0 {
            println!("Allocation retries: {}", self.retries);
        }
        if let Some(ok) = self.checksum_ok {
            println!("Checksum: {}", if ok { "match" } else { "MISMATCH" });
        }
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }
}

impl Default for CodecStats {
    fn default() -> Self {
        Self::new()
    }
}
