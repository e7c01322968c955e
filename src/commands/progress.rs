//! Progress reporting with indicatif

use i2cflash_core::writer::{ChunkProgress, WriteProgress, WriteStats};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress reporter using indicatif progress bars
///
/// One bar for the write and, when verification runs, a second bar below
/// it for the read-back.
pub struct IndicatifProgress {
    multi: MultiProgress,
    current_bar: Option<ProgressBar>,
    total_chunks: usize,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current_bar: None,
            total_chunks: 0,
        }
    }

    fn create_bar(&mut self, total: u64, phase: &str) {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{percent}}%, {{bytes_per_sec}}, {{eta}}) {} {{msg}}",
                    phase
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current_bar = Some(pb);
    }

    fn finish(&mut self, message: &str) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteProgress for IndicatifProgress {
    fn writing(&mut self, total_bytes: u64, total_chunks: usize) {
        self.total_chunks = total_chunks;
        self.create_bar(total_bytes, "Writing");
    }

    fn chunk_written(&mut self, chunk: &ChunkProgress) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(chunk.bytes_written);
            pb.set_message(format!(
                "chunk {}/{} @ 0x{:X}",
                chunk.index + 1,
                self.total_chunks,
                chunk.address
            ));
        }
    }

    fn verifying(&mut self, total_bytes: u64) {
        self.finish("done");
        self.create_bar(total_bytes, "Verifying");
    }

    fn verify_progress(&mut self, bytes_verified: u64) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_verified);
        }
    }

    fn complete(&mut self, stats: &WriteStats) {
        self.finish("done");
        println!(
            "Wrote {} bytes in {} chunks (0x{:X}-0x{:X}){}",
            stats.bytes_written,
            stats.chunks_written,
            stats.start_address,
            stats.end_address,
            if stats.verified { ", verified" } else { "" }
        );
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        // Leave the last position on screen when a job fails mid-way
        if let Some(pb) = self.current_bar.take() {
            pb.abandon();
        }
    }
}
