use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Buffer growth failed. The in-flight append is abandoned and the
    /// accumulator keeps its pre-call state.
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// Caller mistake: seek target outside `[0, total_size]`, or a record
    /// index / intra-record offset naming no live data.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Offset lookup at or beyond the end of live data. A valid query that
    /// has nothing to return yet — "no more to read", not a caller mistake.
    #[error("Offset {0} beyond end of data")]
    NotFound(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
