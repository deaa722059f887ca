use crate::error::{HarvestReportError, Result};
use crate::schema::TimeEntry;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::io::Read;
use std::path::Path;

pub const COLUMN_DATE: &str = "Date";
pub const COLUMN_CLIENT: &str = "Client";
pub const COLUMN_FIRST_NAME: &str = "First Name";
pub const COLUMN_TASK: &str = "Task";
pub const COLUMN_BILLABLE: &str = "Billable?";
pub const COLUMN_HOURS: &str = "Hours";

/// Headers a Harvest detailed time export must carry. Matched exactly.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COLUMN_DATE,
    COLUMN_CLIENT,
    COLUMN_FIRST_NAME,
    COLUMN_TASK,
    COLUMN_BILLABLE,
    COLUMN_HOURS,
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

struct ColumnIndex {
    date: usize,
    client: usize,
    first_name: usize,
    task: usize,
    billable: usize,
    hours: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| HarvestReportError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find(COLUMN_DATE)?,
            client: find(COLUMN_CLIENT)?,
            first_name: find(COLUMN_FIRST_NAME)?,
            task: find(COLUMN_TASK)?,
            billable: find(COLUMN_BILLABLE)?,
            hours: find(COLUMN_HOURS)?,
        })
    }
}

pub fn load_entries_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<TimeEntry>> {
    let path = path.as_ref();
    info!("Loading timesheet export from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_entries_from_reader(file)
}

/// Reads every row of a Harvest export. The first bad row aborts the load.
pub fn load_entries_from_reader<R: Read>(reader: R) -> Result<Vec<TimeEntry>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut entries = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        entries.push(parse_record(&record, &columns)?);
    }

    info!("Loaded {} time entries", entries.len());
    Ok(entries)
}

fn parse_record(record: &StringRecord, columns: &ColumnIndex) -> Result<TimeEntry> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();

    let date_str = required_field(record, columns.date, COLUMN_DATE, line)?;
    let date = parse_date(date_str).ok_or_else(|| HarvestReportError::InvalidDate {
        line,
        value: date_str.to_string(),
    })?;

    let hours_str = required_field(record, columns.hours, COLUMN_HOURS, line)?;
    let hours = parse_hours(hours_str, line)?;

    Ok(TimeEntry {
        date,
        client: field(record, columns.client).to_string(),
        first_name: field(record, columns.first_name).to_string(),
        task: field(record, columns.task).to_string(),
        billable_raw: field(record, columns.billable).to_string(),
        hours,
    })
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn required_field<'r>(
    record: &'r StringRecord,
    index: usize,
    column: &str,
    line: u64,
) -> Result<&'r str> {
    let value = field(record, index);
    if value.is_empty() {
        return Err(HarvestReportError::MissingValue {
            line,
            column: column.to_string(),
        });
    }
    Ok(value)
}

/// Parses a date in ISO form, falling back to day-first then month-first.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|format| {
        let parsed = NaiveDate::parse_from_str(value.trim(), format).ok();
        if parsed.is_some() && *format != DATE_FORMATS[0] {
            debug!("Parsed date '{}' with fallback format {}", value, format);
        }
        parsed
    })
}

fn parse_hours(value: &str, line: u64) -> Result<f64> {
    let hours: f64 = value
        .parse()
        .map_err(|_| HarvestReportError::InvalidHours {
            line,
            value: value.to_string(),
        })?;

    if !hours.is_finite() {
        return Err(HarvestReportError::InvalidHours {
            line,
            value: value.to_string(),
        });
    }

    if hours < 0.0 {
        return Err(HarvestReportError::NegativeHours { line, value: hours });
    }

    Ok(hours)
}
