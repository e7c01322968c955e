//! Read-back verification

use std::io::Read;

use super::{configure_bus, open_firmware, read_chunk, WriteProgress};
use crate::error::{ConfigError, WriteError};
use crate::i2c::I2cRead;
use crate::job::WriteJob;
use crate::programmer::{I2cFeatures, I2cMaster};

/// Read the chip back and compare it with the image
///
/// Reads use the same chunk size and address sequence as the write. Stops at
/// the first differing byte.
pub fn verify_image<M, R, P>(
    master: &mut M,
    job: &WriteJob,
    source: &mut R,
    total_len: u64,
    progress: &mut P,
) -> Result<(), WriteError>
where
    M: I2cMaster + ?Sized,
    R: Read + ?Sized,
    P: WriteProgress + ?Sized,
{
    if !master.features().contains(I2cFeatures::READ) {
        return Err(ConfigError::VerifyUnsupported.into());
    }

    progress.verifying(total_len);

    let mut expected = vec![0u8; job.chunk_size];
    let mut found = vec![0u8; job.chunk_size];
    let mut cursor = job.start_address as u64;
    let mut verified = 0u64;
    let mut chunk = 0usize;

    loop {
        let len = read_chunk(source, &mut expected)
            .map_err(|e| WriteError::file_access(&job.firmware, e))?;
        if len == 0 {
            break;
        }

        let address = cursor as u32;
        let mut xfer = I2cRead::new(job.target, address, job.address_width, &mut found[..len]);
        master
            .receive(&mut xfer)
            .map_err(|source| WriteError::Transport {
                chunk,
                address,
                source,
            })?;

        if let Some(offset) = expected[..len]
            .iter()
            .zip(&found[..len])
            .position(|(e, f)| e != f)
        {
            return Err(WriteError::VerifyMismatch {
                address: address + offset as u32,
                expected: expected[offset],
                found: found[offset],
            });
        }

        cursor += len as u64;
        verified += len as u64;
        chunk += 1;
        progress.verify_progress(verified);
    }

    log::debug!("Verified {} bytes in {} reads", verified, chunk);
    Ok(())
}

/// Compare the chip against the job's firmware without writing
///
/// Opens the firmware, checks it fits, sets the bus clock and runs
/// [`verify_image`]. Returns the number of bytes compared.
pub fn verify_job<M, P>(
    master: &mut M,
    job: &WriteJob,
    progress: &mut P,
) -> Result<u64, WriteError>
where
    M: I2cMaster + ?Sized,
    P: WriteProgress + ?Sized,
{
    if !master.features().contains(I2cFeatures::READ) {
        return Err(ConfigError::VerifyUnsupported.into());
    }

    let (mut reader, total_len) = open_firmware(job)?;
    job.check_image_size(total_len)?;

    log::info!(
        "Verifying {} ({} bytes) against {} at 0x{:X}",
        job.firmware.display(),
        total_len,
        job.target,
        job.start_address
    );

    configure_bus(master, job)?;
    verify_image(master, job, &mut reader, total_len, progress)?;
    Ok(total_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::tests::{job, RecordingMaster};
    use crate::writer::NoProgress;
    use std::io::Cursor;

    #[test]
    fn test_verify_matches() {
        let mut master = RecordingMaster::new();
        let data: Vec<u8> = (0..200u8).collect();
        master.memory[0x40..0x40 + 200].copy_from_slice(&data);

        verify_image(
            &mut master,
            &job(64, 0x40),
            &mut Cursor::new(&data),
            200,
            &mut NoProgress,
        )
        .unwrap();
    }

    #[test]
    fn test_verify_reports_first_mismatch() {
        let mut master = RecordingMaster::new();
        let data = vec![0x00u8; 256];
        master.memory[..256].fill(0x00);
        master.memory[150] = 0x5A;
        master.memory[200] = 0x11;

        let err = verify_image(
            &mut master,
            &job(128, 0),
            &mut Cursor::new(&data),
            256,
            &mut NoProgress,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            WriteError::VerifyMismatch {
                address: 150,
                expected: 0x00,
                found: 0x5A
            }
        ));
    }

    #[test]
    fn test_verify_job_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fw.bin");
        let data: Vec<u8> = (0..100u8).collect();
        std::fs::write(&path, &data).unwrap();

        let mut master = RecordingMaster::new();
        master.memory[0x80..0x80 + 100].copy_from_slice(&data);

        let job = crate::job::WriteJobBuilder::new()
            .target_address(0x50)
            .firmware(&path)
            .start_address(0x80)
            .build()
            .unwrap();

        assert_eq!(verify_job(&mut master, &job, &mut NoProgress).unwrap(), 100);
        assert_eq!(master.baudrate, Some(400_000));
        assert!(master.writes.is_empty());
    }

    #[test]
    fn test_verify_without_read_support() {
        let mut master = RecordingMaster::new();
        master.features = I2cFeatures::empty();

        let err = verify_image(
            &mut master,
            &job(128, 0),
            &mut Cursor::new(vec![0u8; 4]),
            4,
            &mut NoProgress,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WriteError::Configuration(ConfigError::VerifyUnsupported)
        ));
    }
}
