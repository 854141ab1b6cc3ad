use chrono::{DateTime, Local};

use crate::platform::WindowSample;

/// Identity recorded for stretches where the user is away from the keyboard.
pub const IDLE_IDENTITY: &str = "idle";

/// A closed window segment, ready to be appended to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedSegment {
    pub session_id: String,
    pub window_title: String,
    pub app_name: Option<String>,
    pub process_id: Option<u32>,
    pub app_path: Option<String>,
    pub program_name: String,
    pub started_at: DateTime<Local>,
    pub duration_secs: f64,
}

#[derive(Debug, Clone)]
struct OpenSegment {
    identity: String,
    sample: WindowSample,
    started_at: DateTime<Local>,
}

/// Holds the one open segment and turns a stream of foreground samples into
/// closed segments. The sample, idle flag and clock all arrive as arguments;
/// nothing here touches the OS.
pub struct ActivitySegmenter {
    session_id: String,
    open: Option<OpenSegment>,
}

impl ActivitySegmenter {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            open: None,
        }
    }

    /// Feed one poll result. Emits the previous segment when the effective
    /// window identity changed, closing it at `now`.
    ///
    /// When `is_idle` is set the effective identity is [`IDLE_IDENTITY`] no
    /// matter what the sampler reported. An unknown (empty-title) sample is
    /// a no-op: whatever is open stays open.
    pub fn poll(
        &mut self,
        sample: &WindowSample,
        is_idle: bool,
        now: DateTime<Local>,
    ) -> Option<ClosedSegment> {
        let (identity, effective) = if is_idle {
            (IDLE_IDENTITY.to_string(), idle_sample())
        } else {
            if sample.is_unknown() {
                return None;
            }
            (sample.window_title.clone(), sample.clone())
        };

        if let Some(open) = &self.open {
            if open.identity == identity {
                return None;
            }
        }

        let closed = self.close_open(now);
        self.open = Some(OpenSegment {
            identity,
            sample: effective,
            started_at: now,
        });
        closed
    }

    /// Close whatever is open. Called once on shutdown.
    pub fn finish(&mut self, now: DateTime<Local>) -> Option<ClosedSegment> {
        self.close_open(now)
    }

    fn close_open(&mut self, now: DateTime<Local>) -> Option<ClosedSegment> {
        let open = self.open.take()?;
        let elapsed_ms = (now - open.started_at).num_milliseconds().max(0);
        Some(ClosedSegment {
            session_id: self.session_id.clone(),
            program_name: program_name(&open.sample.window_title),
            window_title: open.sample.window_title,
            app_name: open.sample.app_name,
            process_id: open.sample.process_id,
            app_path: open.sample.app_path,
            started_at: open.started_at,
            duration_secs: round_hundredths(elapsed_ms as f64 / 1000.0),
        })
    }
}

fn idle_sample() -> WindowSample {
    WindowSample {
        window_title: IDLE_IDENTITY.to_string(),
        app_name: Some(IDLE_IDENTITY.to_string()),
        process_id: None,
        app_path: None,
    }
}

/// Display name derived from a window title: editors and browsers put the
/// application last, after the final dash.
pub fn program_name(title: &str) -> String {
    title.split('-').last().unwrap_or(title).trim().to_string()
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
