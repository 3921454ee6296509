use bgpgrapher::api::PlayData;
use bgpgrapher::error::QueryError;
use bgpgrapher::path_graph::{collect_replay, Asn, ReplaySnapshots};
use bgpgrapher::shared::EdgeColor;
use serde_json::json;

/// Build replay data from a JSON payload shaped like the bgplay feed
fn play_data(value: serde_json::Value) -> PlayData {
    serde_json::from_value(value).expect("test payload should deserialize")
}

#[test]
fn test_initial_frame_then_matching_events() {
    let data = play_data(json!({
        "resource": "193.0.0.0/21",
        "query_starttime": "2024-05-01T10:00:00",
        "initial_state": [
            {"path": ["100", "200"]},
            {"path": ["999", "300"]}
        ],
        "events": [
            {"type": "A", "timestamp": "2024-05-01T10:00:05", "attrs": {"path": ["100", "300"]}},
            {"type": "A", "timestamp": "2024-05-01T10:00:06", "attrs": {"path": ["999", "300"]}}
        ]
    }));
    let filter = Asn::from("100");

    let frames: Vec<_> = ReplaySnapshots::new(&data, &filter).collect();
    // initial frame plus the one event that starts at AS100
    assert_eq!(frames.len(), 2);

    let initial = frames[0].as_ref().expect("initial frame");
    assert!(initial
        .graph
        .contains_edge(&Asn::from("200"), &Asn::from("100")));
    assert!(!initial.graph.contains_node(&Asn::from("999")));
    assert_eq!(
        initial.graph.edge_color(&Asn::from("200"), &Asn::from("100")),
        Some(EdgeColor::Blue)
    );

    let update = frames[1].as_ref().expect("event frame");
    assert!(update
        .graph
        .contains_edge(&Asn::from("300"), &Asn::from("100")));
    assert_eq!(
        update.graph.edge_color(&Asn::from("300"), &Asn::from("100")),
        Some(EdgeColor::Green)
    );
}

#[test]
fn test_event_frames_are_independent() {
    // replay frames are not cumulative: each event starts from scratch
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [],
        "events": [
            {"type": "A", "timestamp": "t1", "attrs": {"path": ["5", "6"]}},
            {"type": "A", "timestamp": "t2", "attrs": {"path": ["5", "7"]}}
        ]
    }));
    let filter = Asn::from("5");

    let frames: Vec<_> = ReplaySnapshots::new(&data, &filter)
        .map(|frame| frame.expect("all frames ok"))
        .collect();
    assert_eq!(frames.len(), 3);

    let second_event = &frames[2];
    assert!(second_event.graph.contains_node(&Asn::from("7")));
    assert!(!second_event.graph.contains_node(&Asn::from("6")));
}

#[test]
fn test_frame_captions() {
    let data = play_data(json!({
        "resource": "193.0.0.0/21",
        "query_starttime": "2024-05-01T10:00:00",
        "initial_state": [{"path": ["100", "200"]}],
        "events": [
            {"type": "A", "timestamp": "2024-05-01T10:00:05", "attrs": {"path": ["100", "300"]}}
        ]
    }));
    let filter = Asn::from("100");

    let frames: Vec<_> = ReplaySnapshots::new(&data, &filter)
        .map(|frame| frame.expect("all frames ok"))
        .collect();

    assert!(frames[0].caption.contains("193.0.0.0/21"));
    assert!(frames[0].caption.contains("2024-05-01T10:00:00"));
    assert!(frames[1].caption.contains("2024-05-01T10:00:05"));
}

#[test]
fn test_events_without_a_path_are_skipped() {
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [{"path": ["100", "200"]}],
        "events": [
            {"type": "A", "timestamp": "t1"},
            {"type": "A", "timestamp": "t2", "attrs": {}},
            {"type": "A", "timestamp": "t3", "attrs": {"path": ["100", "300"]}}
        ]
    }));
    let filter = Asn::from("100");

    let frames: Vec<_> = ReplaySnapshots::new(&data, &filter).collect();
    // initial frame plus only the event that actually carries a path
    assert_eq!(frames.len(), 2);
}

#[test]
fn test_non_announcement_events_are_flagged() {
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [],
        "events": [
            {"type": "W", "timestamp": "t1", "attrs": {"path": ["100", "200"]}},
            {"type": "A", "timestamp": "t2", "attrs": {"path": ["100", "300"]}}
        ]
    }));
    let filter = Asn::from("100");

    let frames: Vec<_> = ReplaySnapshots::new(&data, &filter).collect();
    assert_eq!(frames.len(), 3);

    match &frames[1] {
        Err(QueryError::UnsupportedEvent { kind, timestamp }) => {
            assert_eq!(kind, "W");
            assert_eq!(timestamp, "t1");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected the withdrawal to be flagged"),
    }
    // iteration continues past the flagged event
    assert!(frames[2].is_ok());
}

#[test]
fn test_collect_replay_separates_skipped_events() {
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [{"path": ["100", "200"]}],
        "events": [
            {"type": "W", "timestamp": "t1", "attrs": {"path": ["100", "200"]}},
            {"type": "A", "timestamp": "t2", "attrs": {"path": ["100", "300"]}}
        ]
    }));
    let filter = Asn::from("100");

    let outcome = collect_replay(&data, &filter).expect("matches exist");
    assert_eq!(outcome.snapshots.len(), 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(matches!(
        outcome.skipped[0],
        QueryError::UnsupportedEvent { .. }
    ));
}

#[test]
fn test_collect_replay_reports_empty_result() {
    // nothing in the window originates at the filter ASN
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [{"path": ["999", "200"]}],
        "events": [
            {"type": "A", "timestamp": "t1", "attrs": {"path": ["999", "300"]}}
        ]
    }));
    let filter = Asn::from("100");

    let err = collect_replay(&data, &filter).err().expect("empty result");
    assert!(matches!(err, QueryError::EmptyResult { .. }));
    assert!(err.to_string().contains("AS100"));
}

#[test]
fn test_initial_only_match_is_not_empty() {
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [{"path": ["100", "200"]}],
        "events": []
    }));
    let filter = Asn::from("100");

    let outcome = collect_replay(&data, &filter).expect("initial match counts");
    assert_eq!(outcome.snapshots.len(), 1);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn test_unsupported_only_match_is_not_empty() {
    // a flagged event still proves the filter matched something
    let data = play_data(json!({
        "resource": "x",
        "query_starttime": "t0",
        "initial_state": [],
        "events": [
            {"type": "W", "timestamp": "t1", "attrs": {"path": ["100", "200"]}}
        ]
    }));
    let filter = Asn::from("100");

    let outcome = collect_replay(&data, &filter).expect("flagged match counts");
    assert_eq!(outcome.snapshots.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
}
