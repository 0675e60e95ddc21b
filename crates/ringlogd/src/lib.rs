//! ringlogd - TCP daemon over a bounded in-memory record log.
//!
//! See [`Server`] for the wire protocol and [`crate::heartbeat`] for the
//! periodic timestamp records.

pub mod cli;
pub mod heartbeat;
pub mod server;

pub use cli::Cli;
pub use server::Server;
