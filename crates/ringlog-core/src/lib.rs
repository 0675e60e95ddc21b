//! ringlog-core — bounded, append-oriented in-memory log store.
//!
//! The store keeps a fixed number of variable-length entries arranged in a
//! ring and exposes them as one logical contiguous byte stream. Writers
//! append newline-terminated records; once a record is complete it becomes an
//! immutable, readable entry. When the ring is full the oldest entry is
//! silently evicted to admit the newest.
//!
//! Readers address the stream two ways:
//! - by absolute byte offset (sequential/streamed reads), resolved across
//!   entry boundaries by [`RingLog::find_entry_for_offset`];
//! - by (record index, intra-record offset), resolved to an absolute offset
//!   by [`RingLog::resolve_record_offset`].
//!
//! [`RingLog`] and [`WriteAccumulator`] define no internal locking; they are
//! designed to sit behind the single mutex [`LogStore`] holds around the
//! pair. Transports (the TCP daemon, tests) consume the core only through
//! `LogStore` and [`LogCursor`].

pub mod accumulator;
pub mod config;
pub mod entry;
pub mod error;
pub mod ring;
pub mod store;

pub use accumulator::WriteAccumulator;
pub use config::Config;
pub use entry::Entry;
pub use error::{Error, Result};
pub use ring::{RingLog, DEFAULT_CAPACITY};
pub use store::{LogCursor, LogStore};
