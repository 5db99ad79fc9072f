// src/data.rs - Session recording: per-frame CSV, HTML report, JSON summary
use crate::classifier::FormClass;
use crate::engine::{FrameReport, SessionSummary};
use crate::reps::RepEvent;
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: u64,
    timestamp_ms: u64,
    // Coarse frame id (100 ms buckets) used by the feedback uploader.
    frame_id: u64,
    classification: String,
    feedback: String,
    phase: String,
    rep_count: u32,
    rep_completed: bool,
    fps: Option<f64>,
    confidence_score: Option<f64>,
    angles: String,
}

pub struct SessionRecorder {
    output_dir: PathBuf,
    session_name: String,
    reports: Vec<FrameReport>,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            reports: Vec::new(),
        }
    }

    pub fn add_frame(&mut self, report: FrameReport) {
        self.reports.push(report);
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn frames(&self) -> &[FrameReport] {
        &self.reports
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("frames.csv");
        ensure_parent(&csv_path)?;

        let file = File::create(&csv_path)
            .with_context(|| format!("failed to create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);

        for report in &self.reports {
            writer.serialize(Self::create_record(report))?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    fn create_record(report: &FrameReport) -> FrameRecord {
        let angles = report
            .assessment
            .debug_angles
            .iter()
            .map(|(name, angle)| format!("{}={}", name, angle))
            .collect::<Vec<_>>()
            .join(";");

        FrameRecord {
            frame: report.frame,
            timestamp_ms: report.timestamp_ms,
            frame_id: report.timestamp_ms / 100,
            classification: report.assessment.classification.to_string(),
            feedback: report.feedback.clone(),
            phase: report.reps.phase.to_string(),
            rep_count: report.reps.rep_count,
            rep_completed: matches!(report.rep_event, Some(RepEvent::Completed { .. })),
            fps: report.timing.fps,
            confidence_score: report.timing.confidence_score,
            angles,
        }
    }

    pub fn write_summary(&self, summary: &SessionSummary) -> Result<PathBuf> {
        let summary_path = self.session_dir().join("summary.json");
        ensure_parent(&summary_path)?;

        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&summary_path, json)
            .with_context(|| format!("failed to write {}", summary_path.display()))?;
        Ok(summary_path)
    }

    pub fn generate_report(&self, summary: &SessionSummary) -> Result<PathBuf> {
        let report_path = self.session_dir().join("report.html");
        ensure_parent(&report_path)?;

        std::fs::write(&report_path, self.create_html_report(summary))
            .with_context(|| format!("failed to write {}", report_path.display()))?;
        Ok(report_path)
    }

    fn count(&self, class: FormClass) -> usize {
        self.reports
            .iter()
            .filter(|r| r.assessment.classification == class)
            .count()
    }

    fn create_html_report(&self, summary: &SessionSummary) -> String {
        let total_frames = self.reports.len();
        let detected = total_frames - self.count(FormClass::NoPerson);
        let detection_rate = if total_frames == 0 {
            0.0
        } else {
            detected as f64 / total_frames as f64 * 100.0
        };

        let rows: String = FormClass::ALL
            .iter()
            .map(|class| {
                format!(
                    r#"        <div class="stat-item">
            <span class="stat-label">{}:</span>
            <span class="stat-value">{} frames</span>
        </div>
"#,
                    class,
                    self.count(*class)
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Training Report - {name}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #4682EA; font-size: 1.2em; }}
    </style>
</head>
<body>
    <h1>{exercise} Session Report</h1>
    <div class="stats">
        <h2>Session: {name}</h2>
        <div class="stat-item">
            <span class="stat-label">Reps:</span>
            <span class="stat-value">{reps}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Total Frames:</span>
            <span class="stat-value">{total}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Person Detected:</span>
            <span class="stat-value">{rate:.1}%</span>
        </div>
{rows}    </div>
</body>
</html>
"#,
            name = escape_html(&self.session_name),
            exercise = escape_html(&summary.exercise),
            reps = summary.rep_count,
            total = total_frames,
            rate = detection_rate,
            rows = rows,
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
