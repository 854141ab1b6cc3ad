use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use env_logger::Builder;
use log::info;

/// Debug builds log to the console; release builds log to a file next to the
/// database. Called once at startup, before any task is spawned.
pub fn init(log_path: &Path) {
    let mut builder = Builder::from_default_env();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        )
    });

    if cfg!(debug_assertions) {
        builder.filter(None, log::LevelFilter::Debug).init();
        info!("Debug mode: logging to console.");
    } else {
        let log_file = File::create(log_path).unwrap_or_else(|err| {
            panic!("Failed to create log file at {:?}: {:?}", log_path, err);
        });
        builder
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .filter(None, log::LevelFilter::Info)
            .init();
        println!("Logging to file at {:?}", log_path);
    }
}
