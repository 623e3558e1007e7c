//! Typed birdwatcher client.
//!
//! Each public call composes one command, runs it through the [`Executor`]
//! exactly once, extracts the JSON payload and maps it into typed entities.
//! Results are never cached and failures are never retried.

use crate::binary;
use crate::command::{
    compose, with_json_format, CollectionFilter, ConnectionContext, Query, SegmentFilter,
};
use crate::config::ClientConfig;
use crate::error::BirdwatcherResult;
use crate::exec::{Executor, ProcessExecutor};
use crate::payload::extract_payload;
use birdwatcher_core::{
    map_records, Checkpoint, ClusterSummary, Collection, Database, Index, Partition, Replica,
    Segment, SegmentState, SegmentStats, Session, WireRecord, SMALL_SEGMENT_THRESHOLD,
};
use serde_json::Value;
use std::path::Path;

/// Timeout applied when neither the config nor the caller sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the birdwatcher diagnostic shell.
///
/// The connection context lives on the instance: `connect` mutates it and
/// every later call reads it. Calls on one instance must be serialized by the
/// caller; separate instances are independent.
///
/// ```no_run
/// use birdwatcher_client::Birdwatcher;
///
/// let mut bw = Birdwatcher::new(None)?;
/// bw.connect("localhost:2379", Some("by-dev"), true);
/// for session in bw.list_sessions()? {
///     println!("{}: {}", session.server_name, session.address);
/// }
/// # Ok::<(), birdwatcher_client::BirdwatcherError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Birdwatcher<E = ProcessExecutor> {
    executor: E,
    context: ConnectionContext,
    timeout_secs: u64,
}

impl Birdwatcher<ProcessExecutor> {
    /// Client over the executable at `binary_path`, or the one [`binary::locate`] finds.
    pub fn new(binary_path: Option<&Path>) -> BirdwatcherResult<Self> {
        let binary = binary::locate(binary_path)?;
        Ok(Self::with_executor(ProcessExecutor::new(binary)))
    }

    /// Client built from a validated configuration, already connected if it names an address.
    pub fn from_config(config: &ClientConfig) -> BirdwatcherResult<Self> {
        config.validate()?;
        let mut client = Self::new(config.binary_path.as_deref())?;
        client.set_timeout(config.timeout_secs);
        if let Some(addr) = &config.etcd_addr {
            client.connect(addr.clone(), config.root_path.as_deref(), config.auto_detect);
        }
        Ok(client)
    }

    pub fn binary(&self) -> &Path {
        self.executor.binary()
    }
}

impl<E: Executor> Birdwatcher<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            context: ConnectionContext::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the etcd target used by every following call.
    pub fn connect(
        &mut self,
        etcd_addr: impl Into<String>,
        root_path: Option<&str>,
        auto_detect: bool,
    ) -> &mut Self {
        self.context = ConnectionContext::new(etcd_addr, root_path.map(str::to_string), auto_detect);
        tracing::debug!(
            etcd_addr = ?self.context.etcd_addr,
            root_path = ?self.context.root_path,
            auto_detect,
            "Connection context set"
        );
        self
    }

    /// Drop the connection context; later commands are sent without a connect prefix.
    pub fn disconnect(&mut self) -> &mut Self {
        self.context = ConnectionContext::default();
        self
    }

    pub fn set_timeout(&mut self, timeout_secs: u64) -> &mut Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> u64 {
        self.timeout_secs
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    // ========== Raw commands ==========

    /// Run an arbitrary command and return its raw output.
    pub fn run_text(&self, command: &str, timeout_secs: Option<u64>) -> BirdwatcherResult<String> {
        let full = compose(&self.context, command);
        self.executor
            .execute(&full, timeout_secs.unwrap_or(self.timeout_secs))
    }

    /// Run an arbitrary command in JSON mode and return the decoded payload.
    pub fn run_json(&self, command: &str, timeout_secs: Option<u64>) -> BirdwatcherResult<Value> {
        let output = self.run_text(&with_json_format(command), timeout_secs)?;
        extract_payload(&output)
    }

    fn list<T>(&self, query: Query, map: fn(&WireRecord) -> T) -> BirdwatcherResult<Vec<T>> {
        let payload = self.run_json(&query.to_string(), None)?;
        Ok(map_records(&payload, map))
    }

    // ========== Sessions ==========

    /// All online component sessions.
    pub fn list_sessions(&self) -> BirdwatcherResult<Vec<Session>> {
        self.list(Query::show_session(), Session::from_record)
    }

    pub fn sessions(&self) -> BirdwatcherResult<Vec<Session>> {
        self.list_sessions()
    }

    pub fn get_coordinators(&self) -> BirdwatcherResult<Vec<Session>> {
        let sessions = self.list_sessions()?;
        Ok(sessions.into_iter().filter(Session::is_coordinator).collect())
    }

    /// Non-coordinator sessions, optionally narrowed to a component type
    /// such as `querynode` or `proxy`.
    pub fn get_nodes(&self, component: Option<&str>) -> BirdwatcherResult<Vec<Session>> {
        let wanted = component.map(str::to_lowercase);
        let sessions = self.list_sessions()?;
        Ok(sessions
            .into_iter()
            .filter(|s| !s.is_coordinator())
            .filter(|s| match &wanted {
                Some(kind) => s.component_type().contains(kind.as_str()),
                None => true,
            })
            .collect())
    }

    // ========== Collections ==========

    pub fn list_collections(&self, filter: &CollectionFilter) -> BirdwatcherResult<Vec<Collection>> {
        self.list(Query::show_collections(filter), Collection::from_record)
    }

    pub fn collections(&self) -> BirdwatcherResult<Vec<Collection>> {
        self.list_collections(&CollectionFilter::default())
    }

    /// First collection matching `collection_id` and/or `name`.
    pub fn get_collection(
        &self,
        collection_id: Option<i64>,
        name: Option<&str>,
    ) -> BirdwatcherResult<Option<Collection>> {
        let filter = CollectionFilter {
            collection_id,
            name: name.map(str::to_string),
            ..CollectionFilter::default()
        };
        Ok(self.list_collections(&filter)?.into_iter().next())
    }

    // ========== Segments ==========

    pub fn list_segments(&self, filter: &SegmentFilter) -> BirdwatcherResult<Vec<Segment>> {
        self.list(Query::show_segment(filter), Segment::from_record)
    }

    pub fn segments(&self) -> BirdwatcherResult<Vec<Segment>> {
        self.list_segments(&SegmentFilter::default())
    }

    pub fn get_segment(&self, segment_id: i64) -> BirdwatcherResult<Option<Segment>> {
        let filter = SegmentFilter::default().segment(segment_id);
        Ok(self.list_segments(&filter)?.into_iter().next())
    }

    /// Flushed segments whose fill ratio is below `threshold`
    /// (default [`SMALL_SEGMENT_THRESHOLD`]).
    ///
    /// The state filter is applied by the tool; the ratio filter locally.
    pub fn get_small_segments(
        &self,
        collection_id: Option<i64>,
        threshold: Option<f64>,
    ) -> BirdwatcherResult<Vec<Segment>> {
        let threshold = threshold.unwrap_or(SMALL_SEGMENT_THRESHOLD);
        let filter = SegmentFilter {
            collection_id,
            state: Some(SegmentState::Flushed),
            ..SegmentFilter::default()
        };
        let segments = self.list_segments(&filter)?;
        Ok(segments
            .into_iter()
            .filter(|s| s.fill_ratio() < threshold)
            .collect())
    }

    // ========== Other listings ==========

    pub fn list_databases(&self) -> BirdwatcherResult<Vec<Database>> {
        self.list(Query::show_database(), Database::from_record)
    }

    pub fn databases(&self) -> BirdwatcherResult<Vec<Database>> {
        self.list_databases()
    }

    pub fn list_partitions(&self, collection_id: i64) -> BirdwatcherResult<Vec<Partition>> {
        self.list(Query::show_partition(collection_id), Partition::from_record)
    }

    pub fn list_indexes(&self, collection_id: Option<i64>) -> BirdwatcherResult<Vec<Index>> {
        self.list(Query::show_index(collection_id), Index::from_record)
    }

    pub fn list_replicas(&self, collection_id: Option<i64>) -> BirdwatcherResult<Vec<Replica>> {
        self.list(Query::show_replica(collection_id), Replica::from_record)
    }

    pub fn list_checkpoints(&self, collection_id: i64) -> BirdwatcherResult<Vec<Checkpoint>> {
        self.list(Query::show_checkpoint(collection_id), Checkpoint::from_record)
    }

    // ========== Health & version ==========

    /// Raw health-check rows as reported by the tool.
    pub fn healthz(&self) -> BirdwatcherResult<Vec<WireRecord>> {
        self.list(Query::healthz(), WireRecord::clone)
    }

    pub fn version(&self) -> BirdwatcherResult<String> {
        let output = self.run_text(&Query::version().to_string(), None)?;
        Ok(output.trim().to_string())
    }

    // ========== Aggregates ==========

    /// Counts over one segment listing; no per-segment queries are issued.
    pub fn get_segment_stats(&self, collection_id: Option<i64>) -> BirdwatcherResult<SegmentStats> {
        let filter = SegmentFilter {
            collection_id,
            ..SegmentFilter::default()
        };
        let segments = self.list_segments(&filter)?;
        Ok(SegmentStats::from_segments(&segments))
    }

    /// One session listing plus one collection listing, folded together.
    pub fn get_cluster_summary(&self) -> BirdwatcherResult<ClusterSummary> {
        let sessions = self.list_sessions()?;
        let collections = self.collections()?;
        Ok(ClusterSummary::from_parts(&sessions, &collections))
    }
}
