use std::sync::Arc;

use dotenvy::dotenv;
use log::{error, info};
use tokio::sync::mpsc::{self, unbounded_channel};
use tokio::sync::Mutex;

use window_tracker::config::Config;
use window_tracker::db::connection::{store_segments, ActivityStore};
use window_tracker::logger;
use window_tracker::tracker::track_window_activity;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = Config::new().unwrap_or_else(|err| {
        panic!("Failed to resolve application paths: {:?}", err);
    });

    logger::init(&config.log_path);
    info!("Logger configured successfully.");

    let store = ActivityStore::open(&config.db_path).unwrap_or_else(|err| {
        error!("Failed to open database at {:?}: {:?}", config.db_path, err);
        panic!("Cannot proceed without database connection");
    });
    info!("Database ready at: {:?}", config.db_path);

    let store = Arc::new(Mutex::new(store));

    let (ctrl_c_tx, ctrl_c_rx) = unbounded_channel::<()>();
    let (tx, rx) = mpsc::unbounded_channel();

    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C detected. Sending shutdown signal...");
            let _ = ctrl_c_tx.send(());
        }
    });

    let tracking_task = tokio::spawn(track_window_activity(
        config.settings.clone(),
        config.session_id.clone(),
        tx,
        ctrl_c_rx,
    ));
    let storage_task = tokio::spawn(store_segments(store, rx));

    let (tracking, storage, _) = tokio::join!(tracking_task, storage_task, signal_task);
    if let Err(err) = tracking {
        error!("Tracking task failed: {:?}", err);
    }
    match storage {
        Ok(Ok(())) => info!("All segments flushed."),
        Ok(Err(err)) => {
            error!("Storage task failed: {:?}", err);
            std::process::exit(1);
        }
        Err(err) => {
            error!("Storage task panicked: {:?}", err);
            std::process::exit(1);
        }
    }
}
