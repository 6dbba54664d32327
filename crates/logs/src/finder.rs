//! Reverse traversal of a log file, newest lines first.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::config::LogsConfig;
use crate::error::{Error, Result};
use crate::extract::{Extraction, extract_lines};
use crate::filter::LineFilter;
use crate::page::{ReadStatus, read_fully};

/// Lines buffered between the finder and its consumer. Bounds in-flight
/// memory at `LINE_BUFFER * max_line_length` bytes per search.
const LINE_BUFFER: usize = 16;

/// A validated request for the most recent lines of one log file.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// File name, relative to the configured logs root.
    pub file: String,

    /// Number of matching lines to produce before ending the stream.
    pub total: u64,

    /// Substrings that must all occur in a line for it to match. An
    /// empty list matches every line.
    pub keywords: Vec<String>,
}

/// An open search over one log file.
///
/// The finder owns the file handle and a snapshot of the file length
/// taken at build time; it must be driven exactly once via
/// [`find_latest_lines`](Self::find_latest_lines), which releases the
/// handle on every exit path.
pub struct LineFinder {
    file: File,
    file_len: u64,
    total: u64,
    filter: LineFilter,
    page_length: usize,
    max_line_length: usize,
}

impl LineFinder {
    /// Resolves the requested file against the logs directory and opens
    /// it read-only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSearch`] when the name is empty, resolves
    /// outside the logs directory, or cannot be opened; [`Error::Io`]
    /// when the opened file's metadata cannot be read.
    pub async fn build(config: &LogsConfig, request: &SearchRequest) -> Result<Self> {
        if config.page_length == 0 || config.max_line_length == 0 {
            return Err(Error::InvalidSearch(
                "page length and max line length must be positive".to_string(),
            ));
        }
        if request.file.is_empty() {
            return Err(Error::InvalidSearch("empty file name".to_string()));
        }

        let path = resolve_within(&config.logs_dir, &request.file).await?;
        let file = File::open(&path)
            .await
            .map_err(|e| Error::InvalidSearch(format!("{}: {e}", request.file)))?;
        let file_len = file.metadata().await?.len();

        debug!(file = %path.display(), len = file_len, "opened log file for reverse search");

        Ok(Self {
            file,
            file_len,
            total: request.total,
            filter: LineFilter::new(&request.keywords),
            page_length: config.page_length,
            max_line_length: config.max_line_length,
        })
    }

    /// Streams matching lines, most recent first, each an owned copy
    /// including its trailing newline (the first line of the file may
    /// lack one). The stream ends after `total` matches, at the file
    /// origin, or silently on a premature EOF; overflow and I/O failures
    /// arrive as a terminal `Err` item. Dropping the stream cancels the
    /// traversal and closes the file.
    ///
    /// Must be called from within a tokio runtime.
    pub fn find_latest_lines(self) -> impl Stream<Item = Result<Bytes>> + Send {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);

        tokio::spawn(async move {
            if let Err(error) = self.drive(&tx).await {
                // The consumer may already be gone; nothing left to do
                // if this send fails.
                let _ = tx.send(Err(error)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    async fn drive(mut self, tx: &mpsc::Sender<Result<Bytes>>) -> Result<()> {
        if self.total == 0 {
            return Ok(());
        }

        let mut page = vec![0u8; self.page_length];
        let mut remainder: Vec<u8> = Vec::new();
        let mut last_position = self.file_len;
        let mut matches = 0u64;

        while last_position > 0 {
            let position = last_position.saturating_sub(self.page_length as u64);
            let length = (last_position - position) as usize;

            match read_fully(&mut self.file, &mut page[..length], position).await? {
                ReadStatus::Full => {}
                ReadStatus::Short => {
                    debug!(position, "short read, ending traversal early");
                    return Ok(());
                }
            }

            let Extraction {
                lines,
                prefix,
                overflow,
            } = extract_lines(self.max_line_length, &page[..length], &remainder);

            if overflow {
                return Err(Error::LineOverflow {
                    max: self.max_line_length,
                });
            }

            for line in &lines {
                if self.filter.matches(line) {
                    if tx.send(Ok(Bytes::copy_from_slice(line))).await.is_err() {
                        // Consumer dropped the stream; stop reading.
                        return Ok(());
                    }
                    matches += 1;
                    if matches == self.total {
                        return Ok(());
                    }
                }
            }

            let next_remainder = prefix.into_owned();
            drop(lines);
            remainder = next_remainder;
            last_position = position;
        }

        // Whatever is left has no preceding newline: it is the first
        // line of the file.
        if !remainder.is_empty() && self.filter.matches(&remainder) {
            let _ = tx.send(Ok(Bytes::from(remainder))).await;
        }

        Ok(())
    }
}

/// Canonicalizes the joined path and requires containment in the logs
/// directory at a path-component boundary. Symlinks are resolved before
/// the check, so a link pointing outside the root is rejected too.
async fn resolve_within(logs_dir: &Path, file: &str) -> Result<PathBuf> {
    let root = tokio::fs::canonicalize(logs_dir)
        .await
        .map_err(|e| Error::InvalidSearch(format!("logs directory unavailable: {e}")))?;

    let joined = tokio::fs::canonicalize(root.join(file))
        .await
        .map_err(|e| Error::InvalidSearch(format!("{file}: {e}")))?;

    if !joined.starts_with(&root) {
        return Err(Error::InvalidSearch(format!(
            "{file}: escapes the logs directory"
        )));
    }

    Ok(joined)
}
