//! Command composition for the birdwatcher shell.
//!
//! The tool keeps no state between invocations, so every command that is not
//! itself a `connect` gets the connect sub-command prepended and both run in
//! one process. Flags are emitted in a fixed order (identity filters before
//! state/level filters) so the same input always yields the same string.
//! Values are not validated here; the tool rejects what it does not accept.

use birdwatcher_core::{CollectionState, SegmentLevel, SegmentState};
use std::fmt;

/// Joins statements on a single command line.
pub const STATEMENT_SEPARATOR: &str = ", ";

/// Appended to an operation when a decoded payload is wanted.
pub const JSON_FORMAT_FLAG: &str = "--format json";

const CONNECT_KEYWORD: &str = "connect";

/// Ambient connection settings applied to every subsequent command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionContext {
    pub etcd_addr: Option<String>,
    pub root_path: Option<String>,
    pub auto_detect: bool,
}

impl ConnectionContext {
    pub fn new(etcd_addr: impl Into<String>, root_path: Option<String>, auto_detect: bool) -> Self {
        Self {
            etcd_addr: Some(etcd_addr.into()),
            root_path,
            auto_detect,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.etcd_addr.is_some()
    }

    /// `connect --etcd <addr>[ --rootPath <root>][ --auto]`, if an address is set.
    pub fn connect_command(&self) -> Option<String> {
        let addr = self.etcd_addr.as_deref()?;
        let mut cmd = format!("{} --etcd {}", CONNECT_KEYWORD, addr);
        if let Some(root) = self.root_path.as_deref() {
            cmd.push_str(" --rootPath ");
            cmd.push_str(root);
        }
        if self.auto_detect {
            cmd.push_str(" --auto");
        }
        Some(cmd)
    }
}

/// Whether `command` is a connect operation and must not be prefixed.
pub fn is_connect_command(command: &str) -> bool {
    command.split_whitespace().next() == Some(CONNECT_KEYWORD)
}

/// Build the full command line for one invocation.
pub fn compose(context: &ConnectionContext, command: &str) -> String {
    if is_connect_command(command) {
        return command.to_string();
    }
    match context.connect_command() {
        Some(connect) => format!("{}{}{}", connect, STATEMENT_SEPARATOR, command),
        None => command.to_string(),
    }
}

/// Request a JSON payload from `command`.
pub fn with_json_format(command: &str) -> String {
    format!("{} {}", command, JSON_FORMAT_FLAG)
}

// ============================================================================
// QUERIES
// ============================================================================

/// One logical operation with its flags, rendered in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    operation: String,
    flags: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            flags: Vec::new(),
        }
    }

    pub fn flag(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.flags.push((name, value.to_string()));
        self
    }

    pub fn opt_flag<T: fmt::Display>(self, name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.flag(name, v),
            None => self,
        }
    }

    pub fn show_session() -> Self {
        Self::new("show session")
    }

    pub fn show_collections(filter: &CollectionFilter) -> Self {
        Self::new("show collections")
            .opt_flag("--id", filter.collection_id)
            .opt_flag("--name", filter.name.as_deref())
            .opt_flag("--dbid", filter.db_id)
            .opt_flag("--state", filter.state)
    }

    pub fn show_segment(filter: &SegmentFilter) -> Self {
        Self::new("show segment")
            .opt_flag("--collection", filter.collection_id)
            .opt_flag("--partition", filter.partition_id)
            .opt_flag("--segment", filter.segment_id)
            .opt_flag("--state", filter.state)
            .opt_flag("--level", filter.level)
    }

    pub fn show_database() -> Self {
        Self::new("show database")
    }

    pub fn show_partition(collection_id: i64) -> Self {
        Self::new("show partition").flag("--collection", collection_id)
    }

    pub fn show_index(collection_id: Option<i64>) -> Self {
        Self::new("show index").opt_flag("--collection", collection_id)
    }

    pub fn show_replica(collection_id: Option<i64>) -> Self {
        Self::new("show replica").opt_flag("--collection", collection_id)
    }

    pub fn show_checkpoint(collection_id: i64) -> Self {
        Self::new("show checkpoint").flag("--collection", collection_id)
    }

    pub fn healthz() -> Self {
        Self::new("healthz")
    }

    pub fn version() -> Self {
        Self::new("version")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operation)?;
        for (name, value) in &self.flags {
            write!(f, " {} {}", name, value)?;
        }
        Ok(())
    }
}

// ============================================================================
// FILTERS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    pub collection_id: Option<i64>,
    pub name: Option<String>,
    pub db_id: Option<i64>,
    pub state: Option<CollectionState>,
}

impl CollectionFilter {
    pub fn id(mut self, collection_id: i64) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn db(mut self, db_id: i64) -> Self {
        self.db_id = Some(db_id);
        self
    }

    pub fn state(mut self, state: CollectionState) -> Self {
        self.state = Some(state);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentFilter {
    pub collection_id: Option<i64>,
    pub partition_id: Option<i64>,
    pub segment_id: Option<i64>,
    pub state: Option<SegmentState>,
    pub level: Option<SegmentLevel>,
}

impl SegmentFilter {
    pub fn collection(mut self, collection_id: i64) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    pub fn partition(mut self, partition_id: i64) -> Self {
        self.partition_id = Some(partition_id);
        self
    }

    pub fn segment(mut self, segment_id: i64) -> Self {
        self.segment_id = Some(segment_id);
        self
    }

    pub fn state(mut self, state: SegmentState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn level(mut self, level: SegmentLevel) -> Self {
        self.level = Some(level);
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================
