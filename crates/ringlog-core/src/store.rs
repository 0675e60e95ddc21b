//! Shared, mutex-guarded log facade.
//!
//! [`LogStore`] pairs a [`RingLog`] with a [`WriteAccumulator`] behind a
//! single [`parking_lot::Mutex`], so writes from concurrent producers are
//! serialized and a commit (accumulator emits an entry, ring admits it,
//! oldest may be evicted) is observed atomically by readers.
//!
//! Readers do not hold positions in the store. Each reader owns a
//! [`LogCursor`] with its own byte position; entry data is `Bytes`, so a
//! read copies out refcounted slices without holding the lock afterwards.

use std::io::SeekFrom;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::accumulator::WriteAccumulator;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::ring::RingLog;

struct StoreInner {
    ring: RingLog,
    accumulator: WriteAccumulator,
}

/// Thread-safe bounded log of newline-terminated records.
pub struct LogStore {
    inner: Mutex<StoreInner>,
}

impl LogStore {
    /// Creates a store whose ring holds at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                ring: RingLog::new(capacity),
                accumulator: WriteAccumulator::new(),
            }),
        }
    }

    /// Feeds one chunk to the accumulator; on a trailing newline the
    /// buffered record is committed to the ring.
    ///
    /// Returns the number of bytes consumed, which is `chunk.len()` on
    /// success. On allocation failure nothing is consumed or committed
    /// and previously buffered bytes are retained.
    pub fn write(&self, chunk: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        let StoreInner { ring, accumulator } = &mut *inner;
        if let Some(entry) = accumulator.append(chunk)? {
            ring.add_entry(entry);
        }
        Ok(chunk.len())
    }

    /// Copies up to `max_len` bytes of committed data starting at `offset`.
    ///
    /// Returns fewer bytes than requested when the end of data intervenes,
    /// and an empty buffer at or past the end. Uncommitted accumulator
    /// bytes are never visible to reads.
    pub fn read_at(&self, offset: u64, max_len: usize) -> Vec<u8> {
        let inner = self.inner.lock();
        let Ok(offset) = usize::try_from(offset) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let Some((mut slot, first, local)) = inner.ring.find_entry_for_offset(offset) else {
            return out;
        };

        let take = max_len.min(first.len() - local);
        out.extend_from_slice(&first.as_bytes()[local..local + take]);

        while out.len() < max_len {
            let Some((next_slot, entry)) = inner.ring.get_next_entry(Some(slot)) else {
                break;
            };
            let take = (max_len - out.len()).min(entry.len());
            out.extend_from_slice(&entry.as_bytes()[..take]);
            slot = next_slot;
        }
        out
    }

    /// Resolves a seek request against the current data length.
    ///
    /// `current` is the caller's position, consulted only for
    /// `SeekFrom::Current`. The resulting position must land in
    /// `[0, total_size]`; anything else is rejected and the caller's
    /// position is unchanged.
    pub fn seek(&self, current: u64, pos: SeekFrom) -> Result<u64> {
        let total = self.total_size() as i128;
        let target = match pos {
            SeekFrom::Start(off) => off as i128,
            SeekFrom::End(delta) => total + delta as i128,
            SeekFrom::Current(delta) => current as i128 + delta as i128,
        };
        if target < 0 || target > total {
            return Err(Error::InvalidArgument(format!(
                "seek target {target} outside [0, {total}]"
            )));
        }
        Ok(target as u64)
    }

    /// Translates (record index, offset within record) to an absolute byte
    /// position, record 0 being the oldest live record.
    pub fn seek_to_record(&self, record_index: u32, intra_offset: u32) -> Result<u64> {
        let inner = self.inner.lock();
        inner
            .ring
            .resolve_record_offset(record_index as usize, intra_offset as usize)
    }

    /// The entry containing `offset`, with the offset's position inside it.
    pub fn entry_at_offset(&self, offset: u64) -> Result<(Bytes, usize)> {
        let inner = self.inner.lock();
        usize::try_from(offset)
            .ok()
            .and_then(|off| inner.ring.find_entry_for_offset(off))
            .map(|(_, entry, local)| (entry.data.clone(), local))
            .ok_or(Error::NotFound(offset))
    }

    /// Total committed bytes currently live.
    pub fn total_size(&self) -> u64 {
        self.inner.lock().ring.total_size() as u64
    }

    /// Number of live records.
    pub fn record_count(&self) -> usize {
        self.inner.lock().ring.len()
    }

    /// Bytes buffered in the accumulator, not yet committed.
    pub fn pending_len(&self) -> usize {
        self.inner.lock().accumulator.pending_len()
    }

    /// Drops all committed records and any buffered partial write.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.ring.reset();
        inner.accumulator.clear();
    }

    /// Commits an already-complete record directly, bypassing accumulation.
    ///
    /// Used for records produced whole (e.g. timestamp marks), which must
    /// not interleave with a client's partially accumulated write.
    pub fn append_record(&self, data: Bytes) -> Result<()> {
        if data.last() != Some(&b'\n') {
            return Err(Error::InvalidArgument(
                "record must end in a newline".to_string(),
            ));
        }
        let mut inner = self.inner.lock();
        inner.ring.add_entry(Entry::new(data));
        Ok(())
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(crate::ring::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LogStore")
            .field("records", &inner.ring.len())
            .field("total_size", &inner.ring.total_size())
            .field("pending", &inner.accumulator.pending_len())
            .finish()
    }
}

/// A reader's position into a shared [`LogStore`].
///
/// The position is plain byte offset state; it is not pinned to an entry,
/// so data evicted underneath a cursor simply reads as whatever now lives
/// at that offset (or nothing, past the end).
#[derive(Debug, Clone)]
pub struct LogCursor {
    store: Arc<LogStore>,
    pos: u64,
}

impl LogCursor {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store, pos: 0 }
    }

    /// Reads up to `max_len` bytes at the cursor and advances it by the
    /// number of bytes returned.
    pub fn read(&mut self, max_len: usize) -> Vec<u8> {
        let data = self.store.read_at(self.pos, max_len);
        self.pos += data.len() as u64;
        data
    }

    /// Repositions the cursor; on error the position is unchanged.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.pos = self.store.seek(self.pos, pos)?;
        Ok(self.pos)
    }

    /// Positions the cursor at `intra_offset` bytes into the given record.
    pub fn seek_to_record(&mut self, record_index: u32, intra_offset: u32) -> Result<u64> {
        self.pos = self.store.seek_to_record(record_index, intra_offset)?;
        Ok(self.pos)
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn rewind(&mut self) {
        self.pos = 0;
    }
}
