//! Chunked firmware writer
//!
//! The writer streams a firmware image into an I2C memory chip one
//! transaction per chunk:
//!
//! 1. Fill a `chunk_size` buffer from the image (short only at end of file)
//! 2. Zero bytes read ends the loop; no empty transaction is ever sent
//! 3. Send one addressed write at the current internal address
//! 4. Wait out the chip's write cycle, then advance the address by the
//!    number of bytes written
//!
//! The first failure aborts the run. Chunks written before it stay on the
//! chip; there is no retry and no rollback. To resume, run again with the
//! start address set to the address reported in the error.

mod progress;
mod verify;

pub use progress::{ChunkProgress, NoProgress, WriteProgress};
pub use verify::{verify_image, verify_job};

use std::fs::File;
use std::io::{self, BufReader, Read};

use crate::error::{ConfigError, Error, WriteError};
use crate::i2c::I2cWrite;
use crate::job::WriteJob;
use crate::programmer::{I2cFeatures, I2cMaster};

/// Statistics from a write job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Number of transactions sent
    pub chunks_written: usize,
    /// Total payload bytes written
    pub bytes_written: u64,
    /// Internal address of the first byte
    pub start_address: u32,
    /// First internal address after the last byte written
    pub end_address: u64,
    /// Whether a read-back pass confirmed the contents
    pub verified: bool,
}

/// Fill `buf` from `source`, stopping early only at end of input
///
/// Returns the number of bytes read. `Interrupted` reads are retried.
pub(crate) fn read_chunk<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Check the chunk size against what the programmer can send at once
fn check_chunk_size<M: I2cMaster + ?Sized>(master: &M, job: &WriteJob) -> Result<(), ConfigError> {
    let max = master.max_write_len();
    if job.chunk_size > max {
        return Err(ConfigError::ChunkTooLarge {
            chunk_size: job.chunk_size,
            max,
        });
    }
    Ok(())
}

/// Stream an image into the chip
///
/// The programmer must already be configured. `total_len` is the image size
/// used for progress reporting and the address-space check; the loop itself
/// runs until `source` is exhausted.
///
/// # Arguments
/// * `master` - Configured I2C programmer
/// * `job` - Target, address width, start address and chunk size
/// * `source` - Image data, read sequentially from its current position
/// * `total_len` - Image size in bytes
/// * `progress` - Progress callback (use `NoProgress` if not needed)
pub fn write_image<M, R, P>(
    master: &mut M,
    job: &WriteJob,
    source: &mut R,
    total_len: u64,
    progress: &mut P,
) -> Result<WriteStats, WriteError>
where
    M: I2cMaster + ?Sized,
    R: Read + ?Sized,
    P: WriteProgress + ?Sized,
{
    check_chunk_size(master, job)?;
    job.check_image_size(total_len)?;

    let limit = job.address_width.max_address_space();
    let mut buf = vec![0u8; job.chunk_size];
    let mut cursor = job.start_address as u64;
    let mut stats = WriteStats {
        start_address: job.start_address,
        end_address: cursor,
        ..Default::default()
    };

    progress.writing(total_len, job.total_chunks(total_len));

    loop {
        let len =
            read_chunk(source, &mut buf).map_err(|e| WriteError::file_access(&job.firmware, e))?;
        if len == 0 {
            break;
        }

        // The image may have grown since `total_len` was taken
        if cursor + len as u64 > limit {
            return Err(ConfigError::ImageExceedsAddressSpace {
                end: cursor + len as u64,
                width: job.address_width.bytes(),
                limit,
            }
            .into());
        }

        let address = cursor as u32;
        let chunk = stats.chunks_written;
        let xfer = I2cWrite::new(job.target, address, job.address_width, &buf[..len]);

        log::debug!(
            "Chunk {}: {} bytes to {} @ 0x{:0width$X}",
            chunk,
            len,
            job.target,
            address,
            width = job.address_width.bytes() as usize * 2
        );

        master
            .transmit(&xfer)
            .map_err(|source| WriteError::Transport {
                chunk,
                address,
                source,
            })?;

        if job.write_cycle_us > 0 {
            master.delay_us(job.write_cycle_us);
        }

        cursor += len as u64;
        stats.chunks_written += 1;
        stats.bytes_written += len as u64;
        stats.end_address = cursor;

        progress.chunk_written(&ChunkProgress {
            index: chunk,
            address,
            len,
            bytes_written: stats.bytes_written,
            total_bytes: total_len,
        });
    }

    Ok(stats)
}

/// Set the bus clock for the job
pub(crate) fn configure_bus<M: I2cMaster + ?Sized>(
    master: &mut M,
    job: &WriteJob,
) -> Result<(), WriteError> {
    master.configure(job.baudrate).map_err(|e| match e {
        Error::UnsupportedSpeed => WriteError::from(ConfigError::UnsupportedBaudrate(job.baudrate)),
        other => WriteError::ConnectionUnavailable(format!("failed to configure bus: {}", other)),
    })?;
    log::debug!("Bus configured at {} Hz", job.baudrate);
    Ok(())
}

/// Open the firmware and its size, mapping failures to `FileAccess`
pub(crate) fn open_firmware(job: &WriteJob) -> Result<(BufReader<File>, u64), WriteError> {
    let file = File::open(&job.firmware).map_err(|e| WriteError::file_access(&job.firmware, e))?;
    let len = file
        .metadata()
        .map_err(|e| WriteError::file_access(&job.firmware, e))?
        .len();
    Ok((BufReader::new(file), len))
}

/// Run a complete write job
///
/// This is the top-level operation:
/// 1. Check the programmer can do what the job asks (chunk size, verify)
/// 2. Open the firmware and check it fits the internal address space
/// 3. Configure the bus clock, once
/// 4. Write the image chunk by chunk
/// 5. If `job.verify` is set, read everything back and compare
///
/// Nothing is sent on the bus if steps 1-3 fail. The firmware file is closed
/// on every exit path.
pub fn run_job<M, P>(
    master: &mut M,
    job: &WriteJob,
    progress: &mut P,
) -> Result<WriteStats, WriteError>
where
    M: I2cMaster + ?Sized,
    P: WriteProgress + ?Sized,
{
    if job.verify && !master.features().contains(I2cFeatures::READ) {
        return Err(ConfigError::VerifyUnsupported.into());
    }
    check_chunk_size(master, job)?;

    let (mut reader, total_len) = open_firmware(job)?;
    job.check_image_size(total_len)?;

    log::info!(
        "Writing {} ({} bytes) to {} on bus {} at 0x{:X}, {} bytes per chunk",
        job.firmware.display(),
        total_len,
        job.target,
        job.bus_id,
        job.start_address,
        job.chunk_size
    );

    configure_bus(master, job)?;

    let mut stats = write_image(master, job, &mut reader, total_len, progress)?;
    drop(reader);

    log::info!(
        "Wrote {} bytes in {} chunks (0x{:X}-0x{:X})",
        stats.bytes_written,
        stats.chunks_written,
        stats.start_address,
        stats.end_address
    );

    if job.verify {
        let (mut reader, total_len) = open_firmware(job)?;
        verify_image(master, job, &mut reader, total_len, progress)?;
        stats.verified = true;
        log::info!("Verified {} bytes", stats.bytes_written);
    }

    progress.complete(&stats);
    Ok(stats)
}
