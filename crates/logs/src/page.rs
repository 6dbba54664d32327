//! Page-granular reads from an open log file.

use std::io::SeekFrom;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::Result;

/// Outcome of an attempt to fill a page buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadStatus {
    /// Every requested byte was read.
    Full,

    /// A zero-length read arrived before the buffer was full. The file
    /// shrank or changed underneath us; the caller ends its traversal
    /// cleanly with whatever it has already produced.
    Short,
}

/// Fills all of `buf` starting at the absolute file `position`, looping
/// over short kernel reads until the buffer is full.
pub(crate) async fn read_fully(
    file: &mut File,
    buf: &mut [u8],
    position: u64,
) -> Result<ReadStatus> {
    file.seek(SeekFrom::Start(position)).await?;

    let mut filled = 0;
    while filled < buf.len() {
        let count = file.read(&mut buf[filled..]).await?;
        if count == 0 {
            return Ok(ReadStatus::Short);
        }
        filled += count;
    }

    Ok(ReadStatus::Full)
}
