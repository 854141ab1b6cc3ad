use std::time::{Duration, Instant};

use chrono::Local;
use log::{error, info};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::platform::{NativeHandle, Platform};
use crate::segmenter::{ActivitySegmenter, ClosedSegment};

/// The polling loop. Samples the foreground window, feeds the segmenter and
/// forwards every closed segment to the storage writer. Exits on the
/// shutdown signal after closing whatever segment is still open.
pub async fn track_window_activity(
    settings: Settings,
    session_id: String,
    tx: mpsc::UnboundedSender<ClosedSegment>,
    mut shutdown_rx: mpsc::UnboundedReceiver<()>,
) {
    let mut segmenter = ActivitySegmenter::new(session_id);
    let poll_interval = Duration::from_millis(settings.poll_interval_ms);

    loop {
        tokio::select! {
            Some(_) = shutdown_rx.recv() => {
                if let Some(segment) = segmenter.finish(Local::now()) {
                    if let Err(err) = tx.send(segment) {
                        error!("Failed to send final segment: {:?}", err);
                    }
                }
                info!("Shutdown signal received. Exiting tracking loop.");
                break;
            },
            _ = async {
                let start = Instant::now();

                let sample = NativeHandle::foreground_window();
                let idle_elapsed = NativeHandle::last_input_elapsed().unwrap_or_default();
                let is_idle = idle_elapsed.as_secs() >= settings.idle_threshold_secs;

                if let Some(segment) = segmenter.poll(&sample, is_idle, Local::now()) {
                    info!(
                        "{} was active for {:.2} seconds",
                        segment.window_title, segment.duration_secs
                    );
                    if let Err(err) = tx.send(segment) {
                        error!("Failed to send segment: {:?}", err);
                        return;
                    }
                }

                tokio::time::sleep(poll_interval.saturating_sub(start.elapsed())).await;
            } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracking_loop_exits_on_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let settings = Settings {
            poll_interval_ms: 10,
            idle_threshold_secs: 60,
        };

        let handle = tokio::spawn(track_window_activity(
            settings,
            "session".to_string(),
            tx,
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        // The sender is dropped with the loop, so the channel drains dry.
        while rx.recv().await.is_some() {}
    }
}
