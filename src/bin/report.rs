use anyhow::Result;
use dotenvy::dotenv;

use window_tracker::config::get_database_path;
use window_tracker::db::connection::ActivityStore;
use window_tracker::report::{build_report, tui::ReportApp};

fn main() -> Result<()> {
    dotenv().ok();

    let db_path = get_database_path()?;
    let store = ActivityStore::open(&db_path)?;
    let report = build_report(&store.fetch_all()?);

    ReportApp::new(report).run()
}
