mod common;

use common::{pose_with_knee_angle, standing_knee_profile};
use form_tracker::data::SessionRecorder;
use form_tracker::replay::{replay, DetectorCallback};
use form_tracker::{EngineConfig, ManualClock, SessionSummary, TrainingSession};
use std::io::Cursor;

fn recorded_callbacks() -> String {
    let mut lines = Vec::new();
    for (i, knee) in [170.0, 120.0, 65.0, 60.0, 130.0, 170.0].into_iter().enumerate() {
        let callback = DetectorCallback {
            timestamp_ms: 1_000 + i as u64 * 300,
            poses: vec![pose_with_knee_angle(knee)],
        };
        lines.push(serde_json::to_string(&callback).unwrap());
    }
    lines.push(serde_json::json!({"timestamp_ms": 2_900, "poses": []}).to_string());
    lines.join("\n")
}

#[test]
fn replay_then_export_session_files() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(0);
    let mut session =
        TrainingSession::with_clock(standing_knee_profile(), EngineConfig::default(), clock.clone())
            .unwrap();

    let reports = replay(Cursor::new(recorded_callbacks()), &mut session, &clock).unwrap();
    assert_eq!(reports.len(), 7);
    assert_eq!(session.state().rep_count, 1);

    let mut recorder = SessionRecorder::new(dir.path(), Some("replay".to_string()));
    for report in reports {
        recorder.add_frame(report);
    }
    let summary = session.summary();

    let csv_path = recorder.export_csv().unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert!(headers.iter().any(|h| h == "rep_count"));
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 7);

    let class_col = headers.iter().position(|h| h == "classification").unwrap();
    let frame_id_col = headers.iter().position(|h| h == "frame_id").unwrap();
    assert_eq!(&rows[0][class_col], "perfect");
    assert_eq!(&rows[0][frame_id_col], "10");
    assert_eq!(&rows[6][class_col], "no_person");

    let report_path = recorder.generate_report(&summary).unwrap();
    let html = std::fs::read_to_string(report_path).unwrap();
    assert!(html.contains("Knee tracking Session Report"));
    assert!(html.contains("<span class=\"stat-value\">1</span>"));

    let summary_path = recorder.write_summary(&summary).unwrap();
    let restored: SessionSummary =
        serde_json::from_str(&std::fs::read_to_string(summary_path).unwrap()).unwrap();
    assert_eq!(restored, summary);
    assert_eq!(restored.frames, 7);
}
