//! Birdwatcher Core - Cluster Metadata Types
//!
//! Pure data structures decoded from the loosely-typed JSON payloads the
//! birdwatcher diagnostic shell prints. This crate performs no I/O: every
//! entity is built from an already-decoded [`WireRecord`] and every
//! conversion is total.

pub mod entities;
pub mod enums;
pub mod record;
pub mod stats;

pub use entities::{
    Checkpoint, Collection, Database, FieldSchema, Index, Partition, Replica, Segment, Session,
    SMALL_SEGMENT_THRESHOLD,
};
pub use enums::{CollectionState, DataType, SegmentLevel, SegmentState};
pub use record::{map_records, WireRecord};
pub use stats::{ClusterSummary, CollectionBrief, ComponentInfo, SegmentStats};

use chrono::{DateTime, TimeZone, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Number of logical bits in a Milvus hybrid timestamp.
pub const LOGICAL_BITS: u32 = 18;

/// Convert a hybrid timestamp into the wall-clock instant of its physical part.
///
/// Returns `None` for zero, which the tool uses for "never set".
pub fn hybrid_ts_to_time(ts: u64) -> Option<Timestamp> {
    if ts == 0 {
        return None;
    }
    let physical_ms = i64::try_from(ts >> LOGICAL_BITS).ok()?;
    Utc.timestamp_millis_opt(physical_ms).single()
}

// ============================================================================
// TESTS
// ============================================================================
