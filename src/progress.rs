//! Stage progress reporting.
//!
//! Generative stages and Notion uploads are slow network calls, so the CLI
//! reports each one as it starts and finishes. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts (`--json`).

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageProgressEvent {
    /// A named stage (`analyze`, `pseudocode`, `explain`, `refine`) began.
    Started { stage: String },
    /// The stage completed successfully.
    Finished { stage: String, elapsed_ms: u64 },
    /// The stage failed; the dispatcher decides what happens next.
    Failed { stage: String, error: String },
    /// Publishing: `n` of `total` blocks sent.
    Uploading { n: u64, total: u64 },
}

/// Reports stage progress. Implementations write to stderr (human or JSON).
pub trait StageProgressReporter: Send + Sync {
    fn report(&self, event: StageProgressEvent);
}

/// Human-friendly progress on stderr: "algonote analyze  done (1,204 ms)".
pub struct StderrProgress;

impl StageProgressReporter for StderrProgress {
    fn report(&self, event: StageProgressEvent) {
        let line = human_line(&event);
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

fn human_line(event: &StageProgressEvent) -> String {
    match event {
        StageProgressEvent::Started { stage } => format!("algonote {}  running...\n", stage),
        StageProgressEvent::Finished { stage, elapsed_ms } => {
            format!("algonote {}  done ({} ms)\n", stage, format_number(*elapsed_ms))
        }
        StageProgressEvent::Failed { stage, error } => {
            format!("algonote {}  failed: {}\n", stage, error)
        }
        StageProgressEvent::Uploading { n, total } => format!(
            "algonote publish  uploading  {} / {} blocks\n",
            format_number(*n),
            format_number(*total)
        ),
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl StageProgressReporter for JsonProgress {
    fn report(&self, event: StageProgressEvent) {
        if let Ok(line) = serde_json::to_string(&json_event(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn json_event(event: &StageProgressEvent) -> serde_json::Value {
    match event {
        StageProgressEvent::Started { stage } => serde_json::json!({
            "event": "progress",
            "stage": stage,
            "phase": "started"
        }),
        StageProgressEvent::Finished { stage, elapsed_ms } => serde_json::json!({
            "event": "progress",
            "stage": stage,
            "phase": "finished",
            "elapsed_ms": elapsed_ms
        }),
        StageProgressEvent::Failed { stage, error } => serde_json::json!({
            "event": "progress",
            "stage": stage,
            "phase": "failed",
            "error": error
        }),
        StageProgressEvent::Uploading { n, total } => serde_json::json!({
            "event": "progress",
            "stage": "publish",
            "phase": "uploading",
            "n": n,
            "total": total
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl StageProgressReporter for NoProgress {
    fn report(&self, _event: StageProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn StageProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn human_lines() {
        let started = StageProgressEvent::Started {
            stage: "analyze".to_string(),
        };
        assert_eq!(human_line(&started), "algonote analyze  running...\n");

        let upload = StageProgressEvent::Uploading { n: 100, total: 1250 };
        assert_eq!(
            human_line(&upload),
            "algonote publish  uploading  100 / 1,250 blocks\n"
        );
    }

    #[test]
    fn json_events_carry_phase() {
        let failed = StageProgressEvent::Failed {
            stage: "explain".to_string(),
            error: "timeout".to_string(),
        };
        let value = json_event(&failed);
        assert_eq!(value["phase"], "failed");
        assert_eq!(value["stage"], "explain");
        assert_eq!(value["error"], "timeout");
    }
}
