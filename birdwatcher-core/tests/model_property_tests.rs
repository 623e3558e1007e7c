use birdwatcher_core::record::WireRecord;
use birdwatcher_core::{
    map_records, CollectionState, DataType, Segment, SegmentLevel, SegmentState, SegmentStats,
    Session,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn known_wire_names() -> Vec<String> {
    SegmentState::ALL
        .iter()
        .map(|s| s.to_string())
        .chain(SegmentLevel::ALL.iter().map(|l| l.to_string()))
        .chain(CollectionState::ALL.iter().map(|c| c.to_string()))
        .chain(DataType::ALL.iter().map(|d| d.to_string()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn unknown_state_strings_map_to_defaults(raw in "[A-Za-z]{12,20}") {
        let normalized = raw.to_ascii_lowercase();
        prop_assume!(!known_wire_names().iter().any(|w| w.to_ascii_lowercase() == normalized));
        prop_assert_eq!(SegmentState::from_wire(&raw), SegmentState::SegmentStateNone);
        prop_assert_eq!(SegmentLevel::from_wire(&raw), SegmentLevel::Legacy);
        prop_assert_eq!(CollectionState::from_wire(&raw), CollectionState::CollectionCreated);
        prop_assert_eq!(DataType::from_wire(&raw), DataType::None);
    }

    #[test]
    fn data_type_codes_are_total(code in any::<i64>()) {
        let dt = DataType::from_value(&json!(code));
        if DataType::ALL.iter().any(|d| i64::from(d.code()) == code) {
            prop_assert_eq!(i64::from(dt.code()), code);
        } else {
            prop_assert_eq!(dt, DataType::None);
        }
    }

    #[test]
    fn segment_mapping_never_panics(
        rows in proptest::option::of(any::<i64>()),
        cap in proptest::option::of(-1_000i64..1_000_000),
        state in proptest::option::of("[A-Za-z]{0,12}"),
    ) {
        let mut record = WireRecord::new();
        if let Some(rows) = rows {
            record.insert("NumOfRows".to_string(), json!(rows));
        }
        if let Some(cap) = cap {
            record.insert("MaxRowNum".to_string(), json!(cap));
        }
        if let Some(state) = state {
            record.insert("State".to_string(), json!(state));
        }
        let seg = Segment::from_record(&record);
        if seg.max_rows <= 0 {
            prop_assert_eq!(seg.fill_ratio(), 0.0);
        }
    }

    #[test]
    fn fill_ratio_small_boundary(cap in 1i64..100_000, rows in 0i64..100_000) {
        let seg = Segment { num_rows: rows, max_rows: cap, ..Segment::default() };
        prop_assert_eq!(seg.is_small(), (rows as f64 / cap as f64) < 0.2);
    }

    #[test]
    fn stats_counts_are_consistent(
        states in proptest::collection::vec(0i64..8, 0..40),
        rows in 0i64..10_000,
    ) {
        let segments: Vec<Segment> = states
            .iter()
            .map(|code| Segment {
                state: SegmentState::from_code(*code),
                num_rows: rows,
                max_rows: 10_000,
                ..Segment::default()
            })
            .collect();
        let stats = SegmentStats::from_segments(&segments);
        prop_assert_eq!(stats.total, segments.len());
        prop_assert_eq!(stats.by_state.values().sum::<usize>(), segments.len());
        prop_assert_eq!(
            stats.healthy_segments + stats.count_in_state(SegmentState::Dropped),
            segments.len()
        );
        prop_assert_eq!(stats.total_rows, rows * stats.healthy_segments as i64);
    }

    #[test]
    fn listing_order_is_preserved(ids in proptest::collection::vec(any::<i64>(), 0..30)) {
        let listing = Value::Array(ids.iter().map(|id| json!({"ServerID": id})).collect());
        let sessions = map_records(&listing, Session::from_record);
        let mapped: Vec<i64> = sessions.iter().map(|s| s.server_id).collect();
        prop_assert_eq!(mapped, ids);
    }
}
