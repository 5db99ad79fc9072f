// src/main.rs - Replay recorded pose callbacks through a training session
use anyhow::{Context, Result};
use clap::Parser;
use form_tracker::data::SessionRecorder;
use form_tracker::replay::replay;
use form_tracker::{EngineConfig, ExerciseProfile, ManualClock, TrainingSession};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "form_tracker", about = "Exercise form analysis and rep counting")]
struct Args {
    /// JSON-lines file of detector callbacks
    input: PathBuf,

    /// Built-in exercise profile (ignored when --profile is given)
    #[arg(long, default_value = "squat")]
    exercise: String,

    /// Custom exercise profile as JSON
    #[arg(long, value_name = "PATH")]
    profile: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    session_name: Option<String>,

    #[arg(long, default_value_t = form_tracker::throttle::DEFAULT_FEEDBACK_INTERVAL_MS)]
    feedback_interval_ms: u64,

    #[arg(long, default_value_t = form_tracker::engine::DEFAULT_MIN_KEYPOINTS)]
    min_keypoints: usize,
}

fn default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.join("FormTracker")))
        .unwrap_or_else(|| PathBuf::from("./output"))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let profile = match &args.profile {
        Some(path) => ExerciseProfile::from_file(path)
            .with_context(|| format!("failed to load profile {}", path.display()))?,
        None => ExerciseProfile::builtin(&args.exercise)?,
    };

    let config = EngineConfig {
        feedback_interval_ms: args.feedback_interval_ms,
        min_keypoints: args.min_keypoints,
    };

    let clock = ManualClock::new(0);
    let mut session = TrainingSession::with_clock(profile, config, clock.clone())?;

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let reports = replay(BufReader::new(file), &mut session, &clock)?;

    let output_dir = args.output_dir.unwrap_or_else(default_output_dir);
    let mut recorder = SessionRecorder::new(output_dir, args.session_name);
    for report in reports {
        recorder.add_frame(report);
    }

    let summary = session.summary();
    let csv_path = recorder.export_csv()?;
    let report_path = recorder.generate_report(&summary)?;
    let summary_path = recorder.write_summary(&summary)?;

    info!(
        exercise = %summary.exercise,
        reps = summary.rep_count,
        frames = summary.frames,
        "session complete"
    );
    println!("You completed {} reps", summary.rep_count);
    println!("Frames:  {}", csv_path.display());
    println!("Report:  {}", report_path.display());
    println!("Summary: {}", summary_path.display());

    Ok(())
}
