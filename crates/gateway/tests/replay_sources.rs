//! Replay source integration tests
//!
//! Drives `FileSource` through the `TelemetrySource` port:
//! 1. Missing endpoint files read as empty streams
//! 2. Records are narrowed to the requested session
//! 3. Ranged fetches keep only in-window samples
//! 4. Session discovery (year, meeting, latest) over a sessions dump
//! 5. Files are re-read on every call
//! 6. Corrupt files surface as decode errors

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use pitwall_gateway::{FileSource, endpoints};
use pitwall_ports::{FetchError, SessionQuery, TelemetrySource, TimeRange};
use serde_json::json;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh directory per test under the system temp dir
fn replay_dir() -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("pitwall-replay-{}-{}", std::process::id(), n));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &PathBuf, endpoint: &str, value: serde_json::Value) {
    std::fs::write(dir.join(format!("{endpoint}.json")), value.to_string()).unwrap();
}

// ============================================================================
// Streams
// ============================================================================

#[tokio::test]
async fn test_missing_file_is_empty_stream() {
    let source = FileSource::new(replay_dir());

    assert!(source.fetch_weather(9158).await.unwrap().is_empty());
    assert!(source.fetch_positions(9158, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_records_narrowed_to_session() {
    let dir = replay_dir();
    write(
        &dir,
        endpoints::DRIVERS,
        json!([
            {"session_key": 9158, "driver_number": 1, "full_name": "Max VERSTAPPEN"},
            {"session_key": 9158, "driver_number": 11, "full_name": "Sergio PEREZ"},
            {"session_key": 9472, "driver_number": 1, "full_name": "Max VERSTAPPEN"}
        ]),
    );
    let source = FileSource::new(&dir);

    assert_eq!(source.fetch_drivers(9158).await.unwrap().len(), 2);
    assert_eq!(source.fetch_drivers(9472).await.unwrap().len(), 1);
    assert!(source.fetch_drivers(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ranged_positions() {
    let dir = replay_dir();
    write(
        &dir,
        endpoints::POSITION,
        json!([
            {"session_key": 9158, "driver_number": 1, "position": 1, "date": "2024-03-02T14:40:00Z"},
            {"session_key": 9158, "driver_number": 1, "position": 1, "date": "2024-03-02T15:01:00Z"},
            {"session_key": 9158, "driver_number": 11, "position": 2, "date": "2024-03-02T15:02:30Z"},
            {"session_key": 9158, "driver_number": 11, "position": 3, "date": "2024-03-02T19:00:00Z"}
        ]),
    );
    let source = FileSource::new(&dir);
    let range = TimeRange::new(
        Utc.with_ymd_and_hms(2024, 3, 2, 14, 50, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 2, 18, 10, 0).unwrap(),
    );

    let records = source.fetch_positions(9158, Some(range)).await.unwrap();
    assert_eq!(records.len(), 2);
}

// ============================================================================
// Session discovery
// ============================================================================

#[tokio::test]
async fn test_session_discovery() {
    let dir = replay_dir();
    write(
        &dir,
        endpoints::SESSIONS,
        json!([
            {"meeting_key": 1229, "session_key": 9157, "session_type": "Qualifying", "date_start": "2024-03-01T16:00:00Z"},
            {"meeting_key": 1229, "session_key": 9158, "session_type": "Race", "date_start": "2024-03-02T15:00:00Z", "date_end": "2024-03-02T17:00:00Z"},
            {"meeting_key": 1230, "session_key": 9165, "session_type": "Race", "date_start": "2024-03-09T17:00:00Z"}
        ]),
    );
    let source = FileSource::new(&dir);

    let races = source.fetch_sessions(&SessionQuery::races_of(2024)).await.unwrap();
    assert_eq!(races.len(), 2);

    let meeting = source.fetch_sessions(&SessionQuery::ByMeeting(1229)).await.unwrap();
    assert_eq!(meeting.len(), 2);

    let latest = source.fetch_sessions(&SessionQuery::latest()).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0]["session_key"], json!(9165));

    assert!(source.fetch_sessions(&SessionQuery::races_of(2023)).await.unwrap().is_empty());
}

// ============================================================================
// Live replay
// ============================================================================

#[tokio::test]
async fn test_files_reread_each_call() {
    let dir = replay_dir();
    let source = FileSource::new(&dir);

    write(
        &dir,
        endpoints::RACE_CONTROL,
        json!([{"session_key": 9158, "flag": "GREEN", "date": "2024-03-02T15:00:00Z"}]),
    );
    assert_eq!(source.fetch_race_control(9158).await.unwrap().len(), 1);

    write(
        &dir,
        endpoints::RACE_CONTROL,
        json!([
            {"session_key": 9158, "flag": "GREEN", "date": "2024-03-02T15:00:00Z"},
            {"session_key": 9158, "category": "SafetyCar", "message": "SAFETY CAR DEPLOYED", "date": "2024-03-02T15:20:00Z"}
        ]),
    );
    assert_eq!(source.fetch_race_control(9158).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_corrupt_file_is_decode_error() {
    let dir = replay_dir();
    std::fs::write(dir.join("pit.json"), "[{\"session_key\": 9158,").unwrap();
    let source = FileSource::new(&dir);

    let err = source.fetch_pit(9158).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}
