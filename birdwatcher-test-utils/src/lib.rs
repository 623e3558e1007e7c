//! Birdwatcher Test Utilities
//!
//! Shared test infrastructure for the birdwatcher workspace:
//! - A scripted executor that replays canned tool output
//! - Wire-record fixtures shaped like real tool payloads
//! - Proptest generators for wire records

pub use birdwatcher_client::{Birdwatcher, BirdwatcherError, BirdwatcherResult, Executor};
pub use birdwatcher_core::{CollectionState, SegmentLevel, SegmentState};

use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// SCRIPTED EXECUTOR
// ============================================================================

/// What one scripted invocation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Successful run with this standard output.
    Output(String),
    /// Failed run whose diagnostic text is classified like a real failure.
    Failure(String),
    Timeout,
}

/// Executor that records every command and answers from a queue.
///
/// Once the queue is exhausted every further call fails with a `Command`
/// error naming the unexpected command.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, u64)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: Reply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_output(&self, output: impl Into<String>) -> &Self {
        self.push(Reply::Output(output.into()))
    }

    /// Composed command lines in call order.
    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Timeouts passed with each call, in call order.
    pub fn timeouts(&self) -> Vec<u64> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn pending(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, command: &str, timeout_secs: u64) -> BirdwatcherResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), timeout_secs));
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Output(out)) => Ok(out),
            Some(Reply::Failure(text)) => Err(BirdwatcherError::from_failure_text(text)),
            Some(Reply::Timeout) => Err(BirdwatcherError::Timeout {
                seconds: timeout_secs,
            }),
            None => Err(BirdwatcherError::Command {
                message: format!("no scripted reply for: {}", command),
            }),
        }
    }
}

/// Client over a scripted executor, not connected.
pub fn scripted_client(replies: impl IntoIterator<Item = Reply>) -> Birdwatcher<ScriptedExecutor> {
    Birdwatcher::with_executor(ScriptedExecutor::with_replies(replies))
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Wire records in the shape the tool prints with `--format json`.

    use super::*;
    use serde_json::{json, Value};

    /// Status line the tool prints before the payload.
    pub const BANNER: &str = "Using meta path: by-dev/meta";

    pub fn session_record(id: i64, server_name: &str) -> Value {
        json!({
            "ServerID": id,
            "ServerName": server_name,
            "Address": format!("10.0.0.{}:19530", id),
            "HostName": format!("{}-{}", server_name, id),
            "Version": "2.4.4",
            "LeaseID": 7_000 + id,
            "Exclusive": false,
        })
    }

    pub fn segment_record(
        id: i64,
        collection_id: i64,
        state: SegmentState,
        num_rows: i64,
        max_rows: i64,
    ) -> Value {
        json!({
            "ID": id,
            "CollectionID": collection_id,
            "PartitionID": collection_id + 1,
            "State": state.to_string(),
            "Level": SegmentLevel::L1.to_string(),
            "NumOfRows": num_rows,
            "MaxRowNum": max_rows,
            "InsertChannel": format!("by-dev-rootcoord-dml_0_{}v0", collection_id),
            "StorageVersion": 2,
            "IsSorted": true,
            "CompactionFrom": [],
            "Binlogs": [{"fieldID": 100}, {"fieldID": 101}],
            "Statslogs": [{"fieldID": 100}],
            "Deltalogs": [],
        })
    }

    pub fn collection_record(id: i64, name: &str) -> Value {
        json!({
            "ID": id,
            "state": CollectionState::CollectionCreated.to_string(),
            "create_time": 0,
            "virtual_channel_names": ["by-dev-rootcoord-dml_0_v0", "by-dev-rootcoord-dml_1_v0"],
            "schema": {
                "name": name,
                "version": 1,
                "fields": [
                    {"fieldID": 100, "name": "pk", "data_type": "Int64", "is_primary_key": true},
                    {
                        "fieldID": 101,
                        "name": "embedding",
                        "data_type": "FloatVector",
                        "type_params": [{"key": "dim", "value": "128"}],
                    },
                ],
            },
        })
    }

    /// Tool output: one banner line followed by a JSON array of `records`.
    pub fn listing(records: impl IntoIterator<Item = Value>) -> String {
        let payload = Value::Array(records.into_iter().collect());
        format!("{}\n{}\n", BANNER, payload)
    }

    /// Output of a listing that matched nothing.
    pub fn empty_listing() -> Reply {
        Reply::Output(format!("{}\n[]\n", BANNER))
    }

    pub fn listing_reply(records: impl IntoIterator<Item = Value>) -> Reply {
        Reply::Output(listing(records))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for wire records.

    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    pub fn arb_segment_state() -> impl Strategy<Value = SegmentState> {
        proptest::sample::select(SegmentState::ALL.to_vec())
    }

    pub fn arb_server_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("rootcoord".to_string()),
            Just("datacoord".to_string()),
            Just("querycoord".to_string()),
            Just("querynode".to_string()),
            Just("datanode".to_string()),
            Just("proxy".to_string()),
        ]
    }

    pub fn arb_session_record() -> impl Strategy<Value = Value> {
        (0i64..10_000, arb_server_name())
            .prop_map(|(id, name)| fixtures::session_record(id, &name))
    }

    pub fn arb_segment_record() -> impl Strategy<Value = Value> {
        (any::<i64>(), 0i64..1_000, arb_segment_state(), 0i64..2_000_000, 0i64..1_000_000)
            .prop_map(|(id, coll, state, rows, max)| {
                fixtures::segment_record(id, coll, state, rows, max)
            })
    }
}
