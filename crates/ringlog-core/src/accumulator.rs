//! Newline-delimited write accumulation.
//!
//! Writers may deliver a record in arbitrary fragments. The accumulator
//! buffers fragments until one arrives whose final byte is `\n`, then
//! commits the whole buffered run as a single [`Entry`]. Only the chunk's
//! trailing byte is inspected: embedded newlines do not split a chunk into
//! multiple records.

use crate::entry::Entry;
use crate::error::Result;

/// Buffers partial writes until a chunk ends in a newline.
#[derive(Debug, Default)]
pub struct WriteAccumulator {
    pending: Option<Vec<u8>>,
}

impl WriteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk, returning the committed entry when `chunk` ends in
    /// a newline.
    ///
    /// An empty chunk is a no-op. On allocation failure the pending buffer
    /// is left exactly as it was before the call, so the caller can report
    /// the error and retry later without losing buffered bytes.
    pub fn append(&mut self, chunk: &[u8]) -> Result<Option<Entry>> {
        if chunk.is_empty() {
            return Ok(None);
        }

        let pending = self.pending.get_or_insert_with(Vec::new);
        pending.try_reserve(chunk.len())?;
        pending.extend_from_slice(chunk);

        if chunk.last() == Some(&b'\n') {
            // take() leaves None, resetting for the next record.
            let data = self.pending.take().unwrap_or_default();
            Ok(Some(Entry::from(data)))
        } else {
            Ok(None)
        }
    }

    /// Number of buffered bytes awaiting a terminating newline.
    pub fn pending_len(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }

    pub fn has_pending(&self) -> bool {
        self.pending_len() > 0
    }

    /// Discards any buffered partial record.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
