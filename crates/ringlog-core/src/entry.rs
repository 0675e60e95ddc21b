use bytes::Bytes;

/// A single committed record in the ring.
///
/// Immutable once committed: the `Bytes` payload is never mutated after the
/// accumulator hands it to the ring, so readers may hold cheap aliases of a
/// live entry's data without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Record payload, including the terminating newline.
    pub data: Bytes,
}

impl Entry {
    /// Create an entry from an owned payload.
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the payload as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for Entry {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
        }
    }
}

impl From<&[u8]> for Entry {
    fn from(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }
}
