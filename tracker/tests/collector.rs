mod common;

use axum::http::StatusCode;
use chrono::{DateTime, TimeZone, Utc};
use common::{profile_response, spawn_stub};
use rank_tracker::collector::Collector;
use rank_tracker::config::Config;
use rank_tracker::error::CollectError;
use rank_tracker::graphql::{parse_profile_response, MatchedUser};
use rank_tracker::history::{load_history, MergeOutcome};

fn config_for(endpoint: &str, dir: &tempfile::TempDir) -> Config {
    let mut config = Config::new("alice");
    config.endpoint = endpoint.to_string();
    config.output = dir.path().join("public").join("data.json");
    config
}

fn user(ranking: u64) -> MatchedUser {
    parse_profile_response(&profile_response("alice", ranking), "alice").unwrap()
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

#[tokio::test]
async fn first_run_creates_single_entry_history() {
    let stub = spawn_stub(StatusCode::OK, &profile_response("alice", 5000)).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&stub.url("/graphql"), &dir);
    let output = config.output.clone();

    let report = Collector::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.outcome, MergeOutcome::Inserted);
    let history = load_history(&output).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["ranking"], 5000);
    assert_eq!(
        history[0]["stats"].as_array().map(Vec::len),
        Some(4),
        "stats are stored unfiltered"
    );
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn same_day_rerun_replaces_entry() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();

    collector.record(user(300), at(2, 6)).await.unwrap();
    let report = collector.record(user(250), at(2, 22)).await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.outcome, MergeOutcome::Replaced { index: 0 });
    let history = load_history(&collector.config().output).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["ranking"], 250);
    assert_eq!(history[0]["timestamp"], "2024-01-02T22:00:00.000Z");
}

#[tokio::test]
async fn distinct_days_append_in_collection_order() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();

    for (day, ranking) in [(3, 900), (4, 850), (5, 870), (6, 800)] {
        collector.record(user(ranking), at(day, 12)).await.unwrap();
    }

    let history = load_history(&collector.config().output).await.unwrap();
    let rankings: Vec<u64> = history.iter().filter_map(|e| e["ranking"].as_u64()).collect();
    assert_eq!(rankings, vec![900, 850, 870, 800]);
}

#[tokio::test]
async fn corrupt_history_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let output = collector.config().output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, "{{ definitely not json").unwrap();

    let report = collector.record(user(42), at(7, 0)).await.unwrap();

    assert_eq!(report.total, 1);
    let history = load_history(&output).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["ranking"], 42);
}

#[tokio::test]
async fn unreadable_bytes_are_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let output = collector.config().output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, [0xff, 0xfe, 0x00, 0x5b]).unwrap();

    let report = collector.record(user(43), at(7, 0)).await.unwrap();

    assert_eq!(report.total, 1);
    let history = load_history(&output).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["ranking"], 43);
}

#[tokio::test]
async fn non_history_json_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let output = collector.config().output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, "42").unwrap();

    let report = collector.record(user(44), at(7, 0)).await.unwrap();

    assert_eq!(report.total, 1);
    let history = load_history(&output).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["ranking"], 44);
}

#[tokio::test]
async fn odd_entries_survive_a_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let output = collector.config().output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(
        &output,
        r#"[
  {"timestamp":"2024-01-01T09:00:00.000Z","username":"alice","ranking":300,"stats":[]},
  {"timestamp":"2024-01-02T09:00:00.000Z","username":"alice","ranking":null,"stats":null},
  {"timestamp":"2024-01-03T09:00:00.000Z","username":"alice","ranking":280,"stats":[],"note":"keep me"}
]"#,
    )
    .unwrap();

    let report = collector.record(user(270), at(4, 9)).await.unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.outcome, MergeOutcome::Inserted);
    let history = load_history(&output).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[1]["ranking"], serde_json::Value::Null);
    assert_eq!(history[2]["note"], "keep me");
    assert_eq!(history[3]["ranking"], 270);
}

#[tokio::test]
async fn same_day_replace_skips_records_it_cannot_type() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let output = collector.config().output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(
        &output,
        r#"[{"username":"alice","ranking":null},
            {"timestamp":"2024-01-05T01:00:00.000Z","username":"alice","ranking":500,"note":"old"}]"#,
    )
    .unwrap();

    let report = collector.record(user(490), at(5, 20)).await.unwrap();

    assert_eq!(report.outcome, MergeOutcome::Replaced { index: 1 });
    let history = load_history(&output).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["ranking"], serde_json::Value::Null);
    assert_eq!(history[1]["ranking"], 490);
    assert!(history[1].get("note").is_none());
}

#[tokio::test]
async fn legacy_object_is_migrated_to_array() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let output = collector.config().output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(
        &output,
        r#"{"timestamp":"2023-12-31T09:00:00.000Z","username":"alice","ranking":999,"stats":[]}"#,
    )
    .unwrap();

    collector.record(user(900), at(1, 9)).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let entries = raw.as_array().expect("history is rewritten as an array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["ranking"], 999);
    assert_eq!(entries[1]["ranking"], 900);
}

#[tokio::test]
async fn graphql_errors_leave_history_untouched() {
    let stub = spawn_stub(
        StatusCode::OK,
        r#"{"errors":[{"message":"too many requests"}],"data":null}"#,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&stub.url("/graphql"), &dir);
    let output = config.output.clone();
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, "[]").unwrap();

    let result = Collector::new(config).unwrap().run().await;

    assert!(matches!(result, Err(CollectError::Api(_))));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]");
}

#[tokio::test]
async fn unknown_user_is_fatal() {
    let stub = spawn_stub(StatusCode::OK, r#"{"data":{"matchedUser":null}}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&stub.url("/graphql"), &dir);
    let output = config.output.clone();

    let result = Collector::new(config).unwrap().run().await;

    assert!(matches!(result, Err(CollectError::Api(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn http_failure_is_fatal() {
    let stub = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&stub.url("/graphql"), &dir);
    let output = config.output.clone();

    let result = Collector::new(config).unwrap().run().await;

    match result {
        Err(CollectError::Status(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected result: {:?}", other.map(|r| r.total)),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens on port 1
    let config = config_for("http://127.0.0.1:1/graphql", &dir);

    let result = Collector::new(config).unwrap().run().await;

    assert!(matches!(result, Err(CollectError::Transport { .. })));
}

#[tokio::test]
async fn unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("public");
    std::fs::write(&blocker, "a file where the directory should be").unwrap();

    let collector = Collector::new(config_for("http://unused.invalid/graphql", &dir)).unwrap();
    let result = collector.record(user(1), at(1, 0)).await;

    assert!(matches!(result, Err(CollectError::HistoryWrite { .. })));
}
