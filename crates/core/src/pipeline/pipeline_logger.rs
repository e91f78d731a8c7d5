use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for per-frame tracking events.
///
/// Keeps the pipeline free of any particular output mechanism: the CLI
/// prints a summary, tests discard everything.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 for live sources.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record whether an entity was tracked in this frame.
    fn tracked(&mut self, entity: &str, present: bool);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn tracked(&mut self, _entity: &str, _present: bool) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct StageTiming {
    calls: usize,
    total_ms: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Presence {
    frames: usize,
    present: usize,
}

/// CLI-oriented logger: per-stage timing, per-entity tracking rate and
/// throughput, reported once at the end of the session.
///
/// Progress lines are throttled to every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, StageTiming>,
    presence: BTreeMap<String, Presence>,
    start_time: Instant,
    frames_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            presence: BTreeMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.presence.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Tracking summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (stage, timing) in &self.timings {
            let avg_ms = if timing.calls == 0 {
                0.0
            } else {
                timing.total_ms / timing.calls as f64
            };
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.2}ms  total {:7.0}ms",
                timing.total_ms
            ));
        }

        for (entity, presence) in &self.presence {
            lines.push(format!(
                "  {entity}: tracked in {}/{} frames ({:.1}%)",
                presence.present,
                presence.frames,
                self.tracking_rate(entity).unwrap_or(0.0) * 100.0
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    /// Fraction of recorded frames in which `entity` was tracked.
    pub fn tracking_rate(&self, entity: &str) -> Option<f64> {
        self.presence
            .get(entity)
            .filter(|p| p.frames > 0)
            .map(|p| p.present as f64 / p.frames as f64)
    }

    /// Average duration of `stage` in milliseconds.
    pub fn average_ms(&self, stage: &str) -> Option<f64> {
        self.timings
            .get(stage)
            .filter(|t| t.calls > 0)
            .map(|t| t.total_ms / t.calls as f64)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Tracking: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Tracking: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.timings.entry(stage.to_string()).or_default();
        entry.calls += 1;
        entry.total_ms += duration_ms;
    }

    fn tracked(&mut self, entity: &str, present: bool) {
        let entry = self.presence.entry(entity.to_string()).or_default();
        entry.frames += 1;
        entry.present += present as usize;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
