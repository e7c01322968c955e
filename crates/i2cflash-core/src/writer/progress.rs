//! Progress reporting for the writer
//!
//! Progress is a side channel: the writer calls into a [`WriteProgress`]
//! after each successful transaction, and nothing the reporter does can
//! change what the writer does next.

use super::WriteStats;

/// Position of the writer after a successful transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    /// Zero-based index of the chunk just written
    pub index: usize,
    /// Internal address the chunk was written to
    pub address: u32,
    /// Payload length of the chunk
    pub len: usize,
    /// Total bytes written so far, including this chunk
    pub bytes_written: u64,
    /// Image size in bytes
    pub total_bytes: u64,
}

impl ChunkProgress {
    /// Percentage of the image written, 0-100
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        (self.bytes_written.min(self.total_bytes) * 100 / self.total_bytes) as u8
    }
}

/// Progress callback for write operations
pub trait WriteProgress {
    /// Called once before the first transaction
    fn writing(&mut self, total_bytes: u64, total_chunks: usize);

    /// Called after each chunk is written
    fn chunk_written(&mut self, chunk: &ChunkProgress);

    /// Called when starting read-back verification
    fn verifying(&mut self, total_bytes: u64);

    /// Called to update verification progress
    fn verify_progress(&mut self, bytes_verified: u64);

    /// Called when the whole job is complete
    fn complete(&mut self, stats: &WriteStats);
}

/// A no-op progress reporter
pub struct NoProgress;

impl WriteProgress for NoProgress {
    fn writing(&mut self, _total_bytes: u64, _total_chunks: usize) {}
    fn chunk_written(&mut self, _chunk: &ChunkProgress) {}
    fn verifying(&mut self, _total_bytes: u64) {}
    fn verify_progress(&mut self, _bytes_verified: u64) {}
    fn complete(&mut self, _stats: &WriteStats) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let mut chunk = ChunkProgress {
            index: 0,
            address: 0,
            len: 128,
            bytes_written: 128,
            total_bytes: 300,
        };
        assert_eq!(chunk.percent(), 42);

        chunk.bytes_written = 300;
        assert_eq!(chunk.percent(), 100);

        chunk.total_bytes = 0;
        assert_eq!(chunk.percent(), 100);
    }
}
