use chrono::{NaiveDate, NaiveTime};

/// One persisted activity row. `program_name` and `session_id` are NULL on
/// rows written before schema version 2; readers derive the program name
/// from the title in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSegment {
    pub id: i64,
    pub title: String,
    pub exe: Option<String>,
    pub pid: Option<u32>,
    pub path: Option<String>,
    pub start_time: NaiveTime,
    pub start_date: NaiveDate,
    pub active_time: f64,
    pub program_name: Option<String>,
    pub session_id: Option<String>,
}
