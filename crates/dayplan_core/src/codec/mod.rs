//! Persistence codec for event collections.
//!
//! # Responsibility
//! - Convert between in-memory events and the durable byte format.
//! - Tolerate partially corrupt input without failing the whole load.
//!
//! # See also
//! - `storage::event_file` for file-level load/save.

pub mod event_codec;

pub use event_codec::{
    decode_events, decode_events_with_report, encode_events, DecodeOutcome, DecodeReport,
};
