//! Integration tests for graph wiring, signals and JSON output.

mod common;

use prep_executor::Pipeline;
use prep_executor::graph::{CollectorNode, NodeBuilder, Signal, SourceNode, StopToken};
use prep_executor::writer::JsonWriter;
use serde_json::Value;
use std::fs;

use common::{action, indexed_schema, row, rows};

#[test]
fn json_output_holds_final_schema_and_records() {
    let schema = indexed_schema(&["name", "city"]);
    let file = tempfile::NamedTempFile::new().unwrap();

    Pipeline::builder()
        .schema(schema.clone())
        .registry(prep_actions::standard_registry())
        .actions(vec![
            action("rename_column", &[("scope", "column"), ("column_id", "0001"), ("new_column_name", "town")]),
            action("delete_single_line", &[("scope", "line"), ("row_id", "2")]),
        ])
        .writer(JsonWriter::new(file.reopen().unwrap()))
        .build()
        .unwrap()
        .execute(rows(&schema, &[&["ada", "paris"], &["alan", "london"], &["grace", "nyc"]]))
        .unwrap();

    let output: Value = serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    let columns: Vec<_> = output["metadata"]["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(columns, ["name", "town"]);

    let records = output["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["0000"], "ada");
    assert_eq!(records[0]["tdpId"], 1);
    assert_eq!(records[1]["0001"], "nyc");
}

#[test]
fn signals_reach_every_branch_once() {
    let (left, left_seen) = CollectorNode::new();
    let (right, right_seen) = CollectorNode::new();
    let mut root = NodeBuilder::new(SourceNode::new())
        .filter(|_| true)
        .dispatch_to(vec![Box::new(left), Box::new(right)]);

    let schema = indexed_schema(&["a"]);
    root.receive(row(&schema, 1, &["x"])).unwrap();
    root.signal(Signal::Stop).unwrap();
    root.signal(Signal::EndOfStream).unwrap();

    for seen in [left_seen, right_seen] {
        let seen = seen.lock();
        assert_eq!(seen.rows.len(), 1);
        assert_eq!(seen.signals, [Signal::Stop, Signal::EndOfStream]);
    }
}

#[test]
fn graph_without_sink_swallows_rows() {
    let mut root = NodeBuilder::new(SourceNode::new()).build();
    let schema = indexed_schema(&["a"]);

    root.receive(row(&schema, 1, &["x"])).unwrap();
    root.receive_schema(schema).unwrap();
    root.signal(Signal::EndOfStream).unwrap();
}

#[test]
fn limit_raises_shared_stop_token() {
    let token = StopToken::new();
    let (sink, seen) = CollectorNode::new();
    let mut root = NodeBuilder::new(SourceNode::new())
        .limit(2, token.clone())
        .to(sink)
        .build();
    let schema = indexed_schema(&["a"]);

    for id in 1..=4 {
        root.receive(row(&schema, id, &["x"])).unwrap();
    }

    assert!(token.is_stopped());
    let seen = seen.lock();
    assert_eq!(seen.rows.len(), 2);
    assert_eq!(seen.signals, [Signal::Stop]);
}

#[test]
fn dump_describes_pipeline_shape() {
    let (collector, _) = CollectorNode::new();
    let pipeline = Pipeline::builder()
        .schema(indexed_schema(&["a"]))
        .with_filter(|_| true)
        .limit(10)
        .branch(collector)
        .build()
        .unwrap();

    assert_eq!(pipeline.dump(), "source\nfilter\naction[]\nlimit(10)\ncollector");
}
