//! Read-only aggregate views folded from already-mapped entity listings.
//!
//! Nothing here queries the cluster: callers fetch each listing once and hand
//! the slices in.

use crate::{Collection, CollectionState, Segment, SegmentLevel, SegmentState, Session};
use serde::Serialize;
use std::collections::BTreeMap;

/// Segment counts and row totals for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SegmentStats {
    pub total: usize,
    pub by_state: BTreeMap<SegmentState, usize>,
    pub by_level: BTreeMap<SegmentLevel, usize>,
    /// Rows across segments that are not dropped, saturating at `i64::MAX`.
    pub total_rows: i64,
    pub healthy_segments: usize,
    /// Flushed segments below the small-segment threshold.
    pub small_segments: usize,
}

impl SegmentStats {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut stats = SegmentStats {
            total: segments.len(),
            ..SegmentStats::default()
        };

        for seg in segments {
            *stats.by_state.entry(seg.state).or_insert(0) += 1;
            *stats.by_level.entry(seg.level).or_insert(0) += 1;

            if seg.state.is_healthy() {
                stats.total_rows = stats.total_rows.saturating_add(seg.num_rows);
                stats.healthy_segments += 1;
            }

            if seg.state == SegmentState::Flushed && seg.is_small() {
                stats.small_segments += 1;
            }
        }

        stats
    }

    pub fn count_in_state(&self, state: SegmentState) -> usize {
        self.by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn count_at_level(&self, level: SegmentLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    pub id: i64,
    pub address: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionBrief {
    pub id: i64,
    pub name: String,
    pub state: CollectionState,
}

/// Component and collection overview of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClusterSummary {
    pub total_components: usize,
    /// Sessions grouped by component type, each group in listing order.
    pub components: BTreeMap<String, Vec<ComponentInfo>>,
    pub total_collections: usize,
    pub collections: Vec<CollectionBrief>,
}

impl ClusterSummary {
    pub fn from_parts(sessions: &[Session], collections: &[Collection]) -> Self {
        let mut components: BTreeMap<String, Vec<ComponentInfo>> = BTreeMap::new();
        for s in sessions {
            components
                .entry(s.component_type())
                .or_default()
                .push(ComponentInfo {
                    id: s.server_id,
                    address: s.address.clone(),
                    version: s.version.clone(),
                });
        }

        Self {
            total_components: sessions.len(),
            components,
            total_collections: collections.len(),
            collections: collections
                .iter()
                .map(|c| CollectionBrief {
                    id: c.id,
                    name: c.name.clone(),
                    state: c.state,
                })
                .collect(),
        }
    }

    pub fn coordinator_count(&self) -> usize {
        self.components
            .iter()
            .filter(|(kind, _)| kind.contains("coord"))
            .map(|(_, members)| members.len())
            .sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(state: SegmentState, level: SegmentLevel, rows: i64, cap: i64) -> Segment {
        Segment {
            state,
            level,
            num_rows: rows,
            max_rows: cap,
            ..Segment::default()
        }
    }

    fn session(id: i64, name: &str) -> Session {
        Session {
            server_id: id,
            server_name: name.to_string(),
            address: format!("10.0.0.{}:19530", id),
            version: "2.4.5".to_string(),
            ..Session::default()
        }
    }

    #[test]
    fn test_segment_stats_flushed_and_dropped() {
        let segments = vec![
            seg(SegmentState::Flushed, SegmentLevel::L1, 10, 100),
            seg(SegmentState::Dropped, SegmentLevel::L1, 50, 100),
        ];
        let stats = SegmentStats::from_segments(&segments);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.healthy_segments, 1);
        assert_eq!(stats.total_rows, 10);
        assert_eq!(stats.count_in_state(SegmentState::Flushed), 1);
        assert_eq!(stats.count_in_state(SegmentState::Dropped), 1);
        assert_eq!(stats.count_in_state(SegmentState::Growing), 0);
        assert_eq!(stats.count_at_level(SegmentLevel::L1), 2);
        assert_eq!(stats.small_segments, 1);
    }

    #[test]
    fn test_small_segments_only_count_flushed() {
        let segments = vec![
            seg(SegmentState::Growing, SegmentLevel::L1, 1, 100),
            seg(SegmentState::Dropped, SegmentLevel::L1, 1, 100),
            seg(SegmentState::Flushed, SegmentLevel::L0, 0, 0),
        ];
        let stats = SegmentStats::from_segments(&segments);
        assert_eq!(stats.small_segments, 1);
        assert_eq!(stats.healthy_segments, 2);
    }

    #[test]
    fn test_total_rows_saturates() {
        let segments = vec![
            seg(SegmentState::Flushed, SegmentLevel::L1, i64::MAX, 100),
            seg(SegmentState::Flushed, SegmentLevel::L1, 1, 100),
        ];
        let stats = SegmentStats::from_segments(&segments);
        assert_eq!(stats.total_rows, i64::MAX);
        assert_eq!(stats.healthy_segments, 2);
    }

    #[test]
    fn test_segment_stats_empty() {
        assert_eq!(SegmentStats::from_segments(&[]), SegmentStats::default());
    }

    #[test]
    fn test_segment_stats_serializes_wire_keys() {
        let stats = SegmentStats::from_segments(&[seg(
            SegmentState::Flushed,
            SegmentLevel::L0,
            5,
            10,
        )]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["by_state"]["Flushed"], 1);
        assert_eq!(json["by_level"]["L0"], 1);
    }

    #[test]
    fn test_cluster_summary_groups_components() {
        let sessions = vec![
            session(1, "querycoord"),
            session(2, "querynode"),
            session(3, "querynode"),
        ];
        let collections = vec![Collection {
            id: 42,
            name: "docs".to_string(),
            state: CollectionState::CollectionCreated,
            ..Collection::default()
        }];
        let summary = ClusterSummary::from_parts(&sessions, &collections);
        assert_eq!(summary.total_components, 3);
        assert_eq!(summary.components["querynode"].len(), 2);
        assert_eq!(summary.components["querynode"][1].id, 3);
        assert_eq!(summary.coordinator_count(), 1);
        assert_eq!(summary.total_collections, 1);
        assert_eq!(summary.collections[0].name, "docs");
    }
}
