use super::{PersistenceError, PersistenceResult};
use crate::request::{ScheduleRequest, validate_request};
use crate::scheduler::ScheduleOutcome;
use crate::task::ScheduleResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn save_request_to_json<P: AsRef<Path>>(
    request: &ScheduleRequest,
    path: P,
) -> PersistenceResult<()> {
    validate_request(request)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, request)?;
    Ok(())
}

/// Load a request and check it is usable: task ids unique, leave well formed and
/// the calendar valid.
pub fn load_request_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ScheduleRequest> {
    let file = File::open(path)?;
    let request: ScheduleRequest = serde_json::from_reader(file)?;
    validate_request(&request)?;
    request.calendar()?;
    Ok(request)
}

pub fn save_results_to_json<P: AsRef<Path>>(
    outcome: &ScheduleOutcome,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, outcome)?;
    Ok(())
}

#[derive(Default, Serialize, Deserialize)]
struct ScheduleResultCsvRecord {
    task_id: String,
    start_date: String,
    due_date: String,
    working_days_used: u32,
    #[serde(default)]
    lane: usize,
}

impl From<&ScheduleResult> for ScheduleResultCsvRecord {
    fn from(result: &ScheduleResult) -> Self {
        Self {
            task_id: result.task_id.clone(),
            start_date: result.start_date.format(DATE_FORMAT).to_string(),
            due_date: result.due_date.format(DATE_FORMAT).to_string(),
            working_days_used: result.working_days_used,
            lane: result.lane,
        }
    }
}

impl TryFrom<ScheduleResultCsvRecord> for ScheduleResult {
    type Error = PersistenceError;

    fn try_from(record: ScheduleResultCsvRecord) -> Result<Self, Self::Error> {
        let start_date = parse_date(&record.task_id, "start_date", &record.start_date)?;
        let due_date = parse_date(&record.task_id, "due_date", &record.due_date)?;
        if due_date < start_date {
            return Err(PersistenceError::InvalidData(format!(
                "task {} due_date {} precedes start_date {}",
                record.task_id, due_date, start_date
            )));
        }
        Ok(Self {
            task_id: record.task_id,
            start_date,
            due_date,
            working_days_used: record.working_days_used,
            lane: record.lane,
        })
    }
}

fn parse_date(task_id: &str, column: &str, value: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|err| {
        PersistenceError::InvalidData(format!(
            "task {task_id} has invalid {column} '{value}': {err}"
        ))
    })
}

/// Write one row per result: `task_id,start_date,due_date,working_days_used,lane`.
pub fn save_results_to_csv<P: AsRef<Path>>(
    results: &[ScheduleResult],
    path: P,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(ScheduleResultCsvRecord::from(result))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_results_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<ScheduleResult>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut results = Vec::new();
    for record in reader.deserialize::<ScheduleResultCsvRecord>() {
        results.push(ScheduleResult::try_from(record?)?);
    }
    Ok(results)
}
