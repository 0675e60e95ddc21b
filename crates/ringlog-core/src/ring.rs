//! Fixed-capacity circular store of committed entries.
//!
//! The ring is an arena of `capacity` nullable slots with two index cursors:
//! `head` (next slot to write) and `tail` (oldest live entry). A `full` flag
//! disambiguates `head == tail` between the empty and full states. Adding to
//! a full ring evicts the oldest entry; the live-entry count never exceeds
//! `capacity`.
//!
//! The concatenation of live entries, oldest to newest, *is* the logical
//! byte stream — there is no per-entry header. Two addressing algorithms map
//! between the stream and entry coordinates:
//! [`RingLog::find_entry_for_offset`] (absolute offset → entry + local
//! offset) and [`RingLog::resolve_record_offset`] (record index + local
//! offset → absolute offset).
//!
//! No internal locking — the caller serializes access (see
//! [`crate::LogStore`]).

use crate::entry::Entry;
use crate::error::{Error, Result};

/// Number of slots a ring holds unless the caller chooses otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

pub struct RingLog {
    /// Slot arena. `None` slots have never held an entry since the last
    /// reset; live slots are exactly `tail..tail+len()` (mod capacity).
    slots: Box<[Option<Entry>]>,

    /// Insertion cursor: index of the next slot to write.
    head: usize,

    /// Eviction cursor: index of the oldest live entry.
    tail: usize,

    /// True iff the ring holds `capacity` live entries.
    full: bool,

    /// Sum of all live entries' lengths; recomputed after every insertion.
    total_size: usize,
}

impl RingLog {
    /// Creates an empty ring with the given number of slots.
    ///
    /// Capacity is fixed for the lifetime of the ring.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        let slots: Vec<Option<Entry>> = (0..capacity).map(|_| None).collect();
        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            full: false,
            total_size: 0,
        }
    }

    /// Returns the fixed slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.head + self.capacity() - self.tail) % self.capacity()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.full && self.head == self.tail
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Sum of all live entries' lengths — the length of the logical stream.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Next index with wrap-around.
    #[inline]
    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    /// Slot index of the `pos`-th live entry (oldest is `pos = 0`).
    #[inline]
    fn slot_of(&self, pos: usize) -> usize {
        (self.tail + pos) % self.capacity()
    }

    /// Inserts `entry` at `head`, evicting the oldest entry when full.
    ///
    /// The evicted entry's buffer is dropped as the slot is overwritten, and
    /// `tail` advances past it, so eviction is atomic from the caller's
    /// perspective. Cannot fail: capacity is fixed and the entry is already
    /// owned.
    pub fn add_entry(&mut self, entry: Entry) {
        let was_full = self.full;

        self.slots[self.head] = Some(entry);
        self.head = self.next_index(self.head);
        if was_full {
            self.tail = self.next_index(self.tail);
        }
        self.full = self.head == self.tail;

        let total = self.iter().map(Entry::len).sum();
        self.total_size = total;
    }

    /// Resolves an absolute byte offset in the logical stream to the entry
    /// containing it.
    ///
    /// Walks live entries oldest to newest, consuming `char_offset` entry by
    /// entry until the residual offset falls inside the current entry.
    /// Bounded at `capacity` steps by construction (`len() <= capacity`), so
    /// a stale or garbage count can never send the walk around the ring
    /// twice.
    ///
    /// Returns the slot index (a stable handle for [`Self::get_next_entry`]),
    /// the entry, and the residual offset within it; `None` when
    /// `char_offset` is at or beyond the end of live data.
    pub fn find_entry_for_offset(&self, char_offset: usize) -> Option<(usize, &Entry, usize)> {
        let mut remaining = char_offset;
        for pos in 0..self.len() {
            let slot = self.slot_of(pos);
            let entry = self.slots[slot].as_ref()?;
            if remaining < entry.len() {
                return Some((slot, entry, remaining));
            }
            remaining -= entry.len();
        }
        None
    }

    /// Iteration primitive over live entries, oldest to newest.
    ///
    /// `after = None` yields the oldest live entry; a slot index yields the
    /// next live entry in insertion order. Returns `None` when the ring is
    /// empty, when `after` names no live slot, or when `after` is the newest
    /// live entry. Entries are located by slot index, never by comparing
    /// references — a handle that survived an eviction simply stops naming a
    /// live slot.
    pub fn get_next_entry(&self, after: Option<usize>) -> Option<(usize, &Entry)> {
        let len = self.len();
        let slot = match after {
            None => {
                if len == 0 {
                    return None;
                }
                self.tail
            }
            Some(slot) => {
                if slot >= self.capacity() {
                    return None;
                }
                let pos = (slot + self.capacity() - self.tail) % self.capacity();
                if pos >= len || pos + 1 >= len {
                    // Not a live slot, or already the newest entry.
                    return None;
                }
                self.next_index(slot)
            }
        };
        self.slots[slot].as_ref().map(|entry| (slot, entry))
    }

    /// Resolves (record index, intra-record offset) to an absolute offset in
    /// the logical stream.
    ///
    /// Record index 0 is the oldest live entry. The inverse of
    /// [`Self::find_entry_for_offset`]: resolving `(i, 0)` and then finding
    /// that offset lands on entry `i` with zero residual.
    ///
    /// An offset equal to the entry's length is allowed (it addresses the
    /// position just past the record, like seeking to end).
    pub fn resolve_record_offset(&self, record_index: usize, intra_offset: usize) -> Result<u64> {
        let len = self.len();
        if record_index >= len {
            return Err(Error::InvalidArgument(format!(
                "record index {record_index} names no live entry ({len} live)"
            )));
        }

        let mut base = 0usize;
        for pos in 0..record_index {
            base += self.slots[self.slot_of(pos)].as_ref().map_or(0, Entry::len);
        }

        let entry_len = self.slots[self.slot_of(record_index)]
            .as_ref()
            .map_or(0, Entry::len);
        if intra_offset > entry_len {
            return Err(Error::InvalidArgument(format!(
                "offset {intra_offset} exceeds record {record_index} length {entry_len}"
            )));
        }

        Ok((base + intra_offset) as u64)
    }

    /// Clears all slots and cursors. Entry buffers are dropped by ownership.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.full = false;
        self.total_size = 0;
    }

    /// Live entries, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        (0..self.len()).filter_map(move |pos| self.slots[self.slot_of(pos)].as_ref())
    }
}

impl Default for RingLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for RingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingLog")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("total_size", &self.total_size)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("full", &self.full)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_with(capacity: usize, payloads: &[&str]) -> RingLog {
        let mut ring = RingLog::new(capacity);
        for p in payloads {
            ring.add_entry(Entry::from(p.as_bytes()));
        }
        ring
    }

    fn live_payloads(ring: &RingLog) -> Vec<Vec<u8>> {
        ring.iter().map(|e| e.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_new_ring_is_empty() {
        let ring = RingLog::new(4);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.total_size(), 0);
        assert_eq!(ring.capacity(), 4);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        let _ = RingLog::new(0);
    }

    #[test]
    fn test_add_until_full() {
        let mut ring = RingLog::new(3);
        ring.add_entry(Entry::from(b"a\n".as_slice()));
        assert_eq!(ring.len(), 1);
        assert!(!ring.is_full());

        ring.add_entry(Entry::from(b"b\n".as_slice()));
        ring.add_entry(Entry::from(b"c\n".as_slice()));
        assert_eq!(ring.len(), 3);
        assert!(ring.is_full());
        assert_eq!(ring.total_size(), 6);
    }

    #[test]
    fn test_eviction_keeps_most_recent_in_order() {
        // Capacity bound: after N > capacity adds, exactly capacity entries
        // are live, and they are the most recent ones in insertion order.
        let capacity = 4;
        let mut ring = RingLog::new(capacity);
        for i in 0..11 {
            ring.add_entry(Entry::from(format!("record-{i}\n").into_bytes()));
        }

        assert_eq!(ring.len(), capacity);
        assert!(ring.is_full());
        let expected: Vec<Vec<u8>> = (7..11)
            .map(|i| format!("record-{i}\n").into_bytes())
            .collect();
        assert_eq!(live_payloads(&ring), expected);
    }

    #[test]
    fn test_total_size_tracks_evictions() {
        let mut ring = RingLog::new(2);
        ring.add_entry(Entry::from(b"aaaa\n".as_slice()));
        ring.add_entry(Entry::from(b"bb\n".as_slice()));
        assert_eq!(ring.total_size(), 8);

        // Evicts "aaaa\n" (5 bytes), admits "c\n" (2 bytes).
        ring.add_entry(Entry::from(b"c\n".as_slice()));
        assert_eq!(ring.total_size(), 5);
        assert_eq!(
            ring.total_size(),
            ring.iter().map(Entry::len).sum::<usize>()
        );
    }

    #[test]
    fn test_capacity_three_eviction_scenario() {
        // add "a\n", "bb\n", "ccc\n", then "dddd\n": the oldest is evicted,
        // live = ["bb\n", "ccc\n", "dddd\n"], total 3 + 4 + 5 = 12.
        let ring = ring_with(3, &["a\n", "bb\n", "ccc\n", "dddd\n"]);

        assert_eq!(
            live_payloads(&ring),
            vec![b"bb\n".to_vec(), b"ccc\n".to_vec(), b"dddd\n".to_vec()]
        );
        assert_eq!(ring.total_size(), 12);

        let (_, entry, local) = ring.find_entry_for_offset(0).unwrap();
        assert_eq!(entry.as_bytes(), b"bb\n");
        assert_eq!(local, 0);
    }

    #[test]
    fn test_find_entry_for_offset_crosses_boundaries() {
        let ring = ring_with(3, &["bb\n", "ccc\n", "dddd\n"]);

        // Offset 2 is the newline of "bb\n".
        let (_, entry, local) = ring.find_entry_for_offset(2).unwrap();
        assert_eq!(entry.as_bytes(), b"bb\n");
        assert_eq!(local, 2);

        // Offset 3 is the first byte of "ccc\n".
        let (_, entry, local) = ring.find_entry_for_offset(3).unwrap();
        assert_eq!(entry.as_bytes(), b"ccc\n");
        assert_eq!(local, 0);

        // Offset 8 is the second byte of "dddd\n".
        let (_, entry, local) = ring.find_entry_for_offset(8).unwrap();
        assert_eq!(entry.as_bytes(), b"dddd\n");
        assert_eq!(local, 1);
    }

    #[test]
    fn test_find_entry_for_offset_exhaustion() {
        let ring = ring_with(3, &["bb\n", "ccc\n", "dddd\n"]);
        let total = ring.total_size();

        // total_size is one past the last byte: nothing there.
        assert!(ring.find_entry_for_offset(total).is_none());
        assert!(ring.find_entry_for_offset(total + 100).is_none());

        // total_size - 1 is the last byte of the newest entry.
        let (_, entry, local) = ring.find_entry_for_offset(total - 1).unwrap();
        assert_eq!(entry.as_bytes(), b"dddd\n");
        assert_eq!(local, entry.len() - 1);
    }

    #[test]
    fn test_find_entry_for_offset_empty_ring() {
        let ring = RingLog::new(5);
        assert!(ring.find_entry_for_offset(0).is_none());
    }

    #[test]
    fn test_get_next_entry_walks_in_insertion_order() {
        let ring = ring_with(3, &["a\n", "b\n", "c\n"]);

        let (slot1, e1) = ring.get_next_entry(None).unwrap();
        assert_eq!(e1.as_bytes(), b"a\n");

        let (slot2, e2) = ring.get_next_entry(Some(slot1)).unwrap();
        assert_eq!(e2.as_bytes(), b"b\n");

        let (slot3, e3) = ring.get_next_entry(Some(slot2)).unwrap();
        assert_eq!(e3.as_bytes(), b"c\n");

        // Newest entry: iteration ends.
        assert!(ring.get_next_entry(Some(slot3)).is_none());
    }

    #[test]
    fn test_get_next_entry_empty_and_stale_handles() {
        let empty = RingLog::new(3);
        assert!(empty.get_next_entry(None).is_none());

        let mut ring = ring_with(2, &["a\n", "b\n"]);
        let (oldest_slot, _) = ring.get_next_entry(None).unwrap();

        // Two more adds evict "a\n" and "b\n"; the old handle no longer
        // names a live predecessor of anything.
        ring.add_entry(Entry::from(b"c\n".as_slice()));
        ring.add_entry(Entry::from(b"d\n".as_slice()));
        let next = ring.get_next_entry(Some(oldest_slot));
        // The slot index may have been reused; whatever comes back must be a
        // live entry, never a dangling reference.
        if let Some((_, entry)) = next {
            assert!(ring.iter().any(|e| e == entry));
        }

        // Out-of-range handle.
        assert!(ring.get_next_entry(Some(99)).is_none());
    }

    #[test]
    fn test_get_next_entry_after_wrap() {
        // Fill past capacity so tail != 0, then walk the whole ring.
        let ring = ring_with(3, &["a\n", "b\n", "c\n", "d\n", "e\n"]);

        let mut collected = Vec::new();
        let mut cursor = ring.get_next_entry(None);
        while let Some((slot, entry)) = cursor {
            collected.push(entry.as_bytes().to_vec());
            cursor = ring.get_next_entry(Some(slot));
        }
        assert_eq!(
            collected,
            vec![b"c\n".to_vec(), b"d\n".to_vec(), b"e\n".to_vec()]
        );
    }

    #[test]
    fn test_resolve_record_offset() {
        let ring = ring_with(3, &["bb\n", "ccc\n", "dddd\n"]);

        assert_eq!(ring.resolve_record_offset(0, 0).unwrap(), 0);
        // Skip "bb\n" (3 bytes), then 1 byte into "ccc\n".
        assert_eq!(ring.resolve_record_offset(1, 1).unwrap(), 4);
        assert_eq!(ring.resolve_record_offset(2, 0).unwrap(), 7);
        // Offset equal to the record length addresses the position just past it.
        assert_eq!(ring.resolve_record_offset(2, 5).unwrap(), 12);
    }

    #[test]
    fn test_resolve_record_offset_out_of_range() {
        let ring = ring_with(3, &["bb\n", "ccc\n"]);

        assert!(matches!(
            ring.resolve_record_offset(2, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ring.resolve_record_offset(0, 4),
            Err(Error::InvalidArgument(_))
        ));

        let empty = RingLog::new(3);
        assert!(empty.resolve_record_offset(0, 0).is_err());
    }

    #[test]
    fn test_offset_record_round_trip() {
        // find_entry_for_offset(resolve_record_offset(i, 0)) must land on
        // entry i with zero residual, for every live record index.
        let ring = ring_with(5, &["x\n", "yy\n", "zzz\n", "wwww\n", "v\n", "uu\n"]);
        let live: Vec<&Entry> = ring.iter().collect();

        for (i, expected) in live.iter().enumerate() {
            let abs = ring.resolve_record_offset(i, 0).unwrap();
            let (_, entry, local) = ring.find_entry_for_offset(abs as usize).unwrap();
            assert_eq!(entry, *expected, "record {i}");
            assert_eq!(local, 0, "record {i}");
        }
    }

    #[test]
    fn test_reset() {
        let mut ring = ring_with(3, &["a\n", "b\n", "c\n", "d\n"]);
        assert!(ring.is_full());

        ring.reset();
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.total_size(), 0);
        assert!(ring.find_entry_for_offset(0).is_none());

        // Usable again after reset.
        ring.add_entry(Entry::from(b"e\n".as_slice()));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.total_size(), 2);
    }

    #[test]
    fn test_debug_format() {
        let ring = ring_with(3, &["a\n", "b\n"]);
        let s = format!("{ring:?}");
        assert!(s.contains("RingLog"));
        assert!(s.contains("capacity"));
        assert!(s.contains("total_size"));
    }
}
