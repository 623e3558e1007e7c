//! Core entity structures
//!
//! Each entity is an immutable value built by `from_record` from one decoded
//! wire record. Every field has a default, so a record with missing or
//! mistyped fields still produces a fully-populated entity.

use crate::record::{
    get_bool, get_i64, get_i64_list, get_kv_map, get_len, get_object, get_str, get_str_list,
    get_u64, get_value, WireRecord,
};
use crate::{hybrid_ts_to_time, CollectionState, DataType, SegmentLevel, SegmentState, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fill ratio under which a segment counts as small.
pub const SMALL_SEGMENT_THRESHOLD: f64 = 0.2;

// ============================================================================
// SESSIONS
// ============================================================================

/// Online component session registered in etcd.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub server_id: i64,
    pub server_name: String,
    pub address: String,
    pub hostname: String,
    pub version: String,
    pub lease_id: i64,
    pub exclusive: bool,
}

impl Session {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            server_id: get_i64(record, "ServerID"),
            server_name: get_str(record, "ServerName"),
            address: get_str(record, "Address"),
            hostname: get_str(record, "HostName"),
            version: get_str(record, "Version"),
            lease_id: get_i64(record, "LeaseID"),
            exclusive: get_bool(record, "Exclusive"),
        }
    }

    /// Coordinators are recognized by naming convention only.
    pub fn is_coordinator(&self) -> bool {
        self.component_type().contains("coord")
    }

    /// Lower-cased server name, e.g. `querynode` or `datacoord`.
    pub fn component_type(&self) -> String {
        self.server_name.to_lowercase()
    }
}

// ============================================================================
// COLLECTIONS
// ============================================================================

/// One field of a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    pub field_id: i64,
    pub name: String,
    pub data_type: DataType,
    pub is_primary_key: bool,
    pub auto_id: bool,
    pub is_partition_key: bool,
    pub is_clustering_key: bool,
    pub is_dynamic: bool,
    pub nullable: bool,
    pub type_params: BTreeMap<String, String>,
}

impl FieldSchema {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            field_id: get_i64(record, "fieldID"),
            name: get_str(record, "name"),
            data_type: get_value(record, "data_type")
                .map(DataType::from_value)
                .unwrap_or_default(),
            is_primary_key: get_bool(record, "is_primary_key"),
            auto_id: get_bool(record, "autoID"),
            is_partition_key: get_bool(record, "is_partition_key"),
            is_clustering_key: get_bool(record, "is_clustering_key"),
            is_dynamic: get_bool(record, "is_dynamic"),
            nullable: get_bool(record, "nullable"),
            type_params: get_kv_map(record, "type_params"),
        }
    }

    /// Vector dimension from the `dim` type parameter, if present.
    pub fn dim(&self) -> Option<u32> {
        self.type_params.get("dim").and_then(|d| d.parse().ok())
    }
}

/// Collection metadata with its schema and channel topology.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub db_id: i64,
    pub state: CollectionState,
    pub schema_version: i64,
    pub fields: Vec<FieldSchema>,
    pub consistency_level: String,
    pub virtual_channels: Vec<String>,
    pub physical_channels: Vec<String>,
    pub properties: BTreeMap<String, String>,
    /// Hybrid creation timestamp, zero when the tool does not report it.
    pub create_time: u64,
    pub enable_dynamic_field: bool,
}

impl Collection {
    pub fn from_record(record: &WireRecord) -> Self {
        let empty = WireRecord::new();
        let schema = get_object(record, "schema").unwrap_or(&empty);
        let fields = match get_value(schema, "fields") {
            Some(value) => crate::map_records(value, FieldSchema::from_record),
            None => Vec::new(),
        };

        Self {
            id: get_i64(record, "ID"),
            name: get_str(schema, "name"),
            db_id: get_i64(record, "db_id"),
            state: CollectionState::from_wire(&get_str(record, "state")),
            schema_version: get_i64(schema, "version"),
            fields,
            consistency_level: get_str(record, "consistency_level"),
            virtual_channels: get_str_list(record, "virtual_channel_names"),
            physical_channels: get_str_list(record, "physical_channel_names"),
            properties: get_kv_map(record, "properties"),
            create_time: get_u64(record, "create_time"),
            enable_dynamic_field: get_bool(schema, "enable_dynamic_field"),
        }
    }

    /// One virtual channel per shard.
    pub fn num_shards(&self) -> usize {
        self.virtual_channels.len()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn pk_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    pub fn vector_fields(&self) -> Vec<&FieldSchema> {
        self.fields.iter().filter(|f| f.data_type.is_vector()).collect()
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        hybrid_ts_to_time(self.create_time)
    }
}

// ============================================================================
// SEGMENTS
// ============================================================================

/// Segment metadata as tracked by the data coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    pub collection_id: i64,
    pub partition_id: i64,
    pub state: SegmentState,
    pub level: SegmentLevel,
    pub num_rows: i64,
    pub max_rows: i64,
    pub insert_channel: String,
    pub storage_version: i64,
    pub is_sorted: bool,
    /// Source segments this one was compacted from.
    pub compaction_from: Vec<i64>,
    pub binlog_count: usize,
    pub statslog_count: usize,
    pub deltalog_count: usize,
}

impl Segment {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            id: get_i64(record, "ID"),
            collection_id: get_i64(record, "CollectionID"),
            partition_id: get_i64(record, "PartitionID"),
            state: SegmentState::from_wire(&get_str(record, "State")),
            level: SegmentLevel::from_wire(&get_str(record, "Level")),
            num_rows: get_i64(record, "NumOfRows"),
            max_rows: get_i64(record, "MaxRowNum"),
            insert_channel: get_str(record, "InsertChannel"),
            storage_version: get_i64(record, "StorageVersion"),
            is_sorted: get_bool(record, "IsSorted"),
            compaction_from: get_i64_list(record, "CompactionFrom"),
            binlog_count: get_len(record, "Binlogs"),
            statslog_count: get_len(record, "Statslogs"),
            deltalog_count: get_len(record, "Deltalogs"),
        }
    }

    /// `num_rows / max_rows`, or `0.0` when the capacity is unknown (zero or negative).
    pub fn fill_ratio(&self) -> f64 {
        if self.max_rows <= 0 {
            return 0.0;
        }
        self.num_rows as f64 / self.max_rows as f64
    }

    pub fn is_small(&self) -> bool {
        self.fill_ratio() < SMALL_SEGMENT_THRESHOLD
    }

    pub fn is_compacted(&self) -> bool {
        !self.compaction_from.is_empty()
    }
}

// ============================================================================
// FLAT RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Partition {
    pub id: i64,
    pub name: String,
    pub collection_id: i64,
    pub state: String,
}

impl Partition {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            id: get_i64(record, "partition_id"),
            name: get_str(record, "partition_name"),
            collection_id: get_i64(record, "collection_id"),
            state: get_str(record, "state"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Index {
    pub index_id: i64,
    pub index_name: String,
    pub collection_id: i64,
    pub field_id: i64,
    pub index_params: BTreeMap<String, String>,
    pub is_deleted: bool,
}

impl Index {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            index_id: get_i64(record, "index_id"),
            index_name: get_str(record, "index_name"),
            collection_id: get_i64(record, "collection_id"),
            field_id: get_i64(record, "field_id"),
            index_params: get_kv_map(record, "index_params"),
            is_deleted: get_bool(record, "is_deleted"),
        }
    }

    /// The `index_type` parameter, e.g. `HNSW`.
    pub fn index_type(&self) -> Option<&str> {
        self.index_params.get("index_type").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Replica {
    pub replica_id: i64,
    pub collection_id: i64,
    pub resource_group: String,
    pub nodes: Vec<i64>,
}

impl Replica {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            replica_id: get_i64(record, "replicaID"),
            collection_id: get_i64(record, "collectionID"),
            resource_group: get_str(record, "resource_group"),
            nodes: get_i64_list(record, "nodes"),
        }
    }
}

/// Last acknowledged position within a channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub channel: String,
    pub msg_id: String,
    pub timestamp: u64,
}

impl Checkpoint {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            channel: get_str(record, "channel"),
            msg_id: get_str(record, "msg_id"),
            timestamp: get_u64(record, "timestamp"),
        }
    }

    pub fn position_time(&self) -> Option<Timestamp> {
        hybrid_ts_to_time(self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Database {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub properties: BTreeMap<String, String>,
}

impl Database {
    pub fn from_record(record: &WireRecord) -> Self {
        Self {
            id: get_i64(record, "id"),
            name: get_str(record, "name"),
            state: get_str(record, "state"),
            properties: get_kv_map(record, "properties"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
