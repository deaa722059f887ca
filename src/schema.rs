use crate::error::{HarvestReportError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Substring in a task label that marks the entry as leave.
pub const LEAVE_TASK_MARKER: &str = "Holiday";

/// Raw billable flag value that marks an entry as billable.
pub const BILLABLE_FLAG_YES: &str = "Yes";

/// One row of a Harvest time export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub date: NaiveDate,
    /// Client name as recorded, before normalization
    pub client: String,
    /// Employee key. Harvest exports carry no stable id, so two people sharing
    /// a first name are merged.
    pub first_name: String,
    pub task: String,
    /// "Yes" or "No" as recorded in the export
    pub billable_raw: String,
    pub hours: f64,
}

impl TimeEntry {
    pub fn new(
        date: NaiveDate,
        client: impl Into<String>,
        first_name: impl Into<String>,
        task: impl Into<String>,
        billable_raw: impl Into<String>,
        hours: f64,
    ) -> Self {
        Self {
            date,
            client: client.into(),
            first_name: first_name.into(),
            task: task.into(),
            billable_raw: billable_raw.into(),
            hours,
        }
    }

    /// Leave tasks override the recorded billable flag.
    pub fn status(&self) -> BillableStatus {
        if self.task.contains(LEAVE_TASK_MARKER) {
            BillableStatus::Leave
        } else if self.billable_raw == BILLABLE_FLAG_YES {
            BillableStatus::Billable
        } else {
            BillableStatus::NonBillable
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum BillableStatus {
    #[schemars(description = "Hours recorded against a billable task")]
    Billable,

    #[schemars(description = "Hours recorded against a non-billable task")]
    NonBillable,

    #[schemars(description = "Holiday or leave hours, whatever the recorded billable flag")]
    Leave,
}

impl BillableStatus {
    pub const ALL: [BillableStatus; 3] = [
        BillableStatus::Billable,
        BillableStatus::NonBillable,
        BillableStatus::Leave,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BillableStatus::Billable => "Billable",
            BillableStatus::NonBillable => "Non-Billable",
            BillableStatus::Leave => "Leave",
        }
    }

    /// Chart colour used for this status across every view
    pub fn color(&self) -> &'static str {
        match self {
            BillableStatus::Billable => "#0A9396",
            BillableStatus::NonBillable => "#BB3E03",
            BillableStatus::Leave => "#6C757D",
        }
    }
}

impl std::fmt::Display for BillableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Exact-match selection applied before aggregation. `None` means no filtering
/// on that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntryFilter {
    #[schemars(description = "Normalized client name to keep (e.g. 'Internal', 'Acme Corp')")]
    #[serde(default)]
    pub client: Option<String>,

    #[schemars(description = "Employee first name to keep")]
    #[serde(default)]
    pub employee: Option<String>,

    #[schemars(description = "Billable status to keep")]
    #[serde(default)]
    pub status: Option<BillableStatus>,
}

impl EntryFilter {
    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.employee.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HolidayDefinition {
    #[schemars(description = "Date of the public holiday in YYYY-MM-DD format")]
    pub date: NaiveDate,

    #[schemars(description = "Holiday name as published for the region (e.g. 'Hari Raya Puasa')")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    #[schemars(
        description = "Expected hours per employee per week. Drives the capacity meter on the member breakdown. Defaults to 35."
    )]
    #[serde(default = "default_capacity_hours_per_week")]
    pub capacity_hours_per_week: f64,

    #[schemars(description = "Working days in a week (1-7). Daily capacity is weekly capacity divided by this.")]
    #[serde(default = "default_working_days_per_week")]
    pub working_days_per_week: u32,

    #[schemars(
        description = "Fraction of full capacity treated as the lower ('enough') bound. Range 0.0 to 1.0, default 0.8."
    )]
    #[serde(default = "default_capacity_lower_ratio")]
    pub capacity_lower_ratio: f64,

    #[schemars(
        description = "Case-insensitive keywords. Any client whose name contains one of these is reported as 'Internal'."
    )]
    #[serde(default = "default_internal_keywords")]
    pub internal_keywords: Vec<String>,

    #[schemars(description = "Number of clients shown in the client hours chart")]
    #[serde(default = "default_top_clients")]
    pub top_clients: usize,

    #[schemars(
        description = "Country/subdivision code of the configured holiday list (e.g. 'MY-SGR'). Empty by default, as no holidays ship with the crate."
    )]
    #[serde(default = "default_holiday_region")]
    pub holiday_region: String,

    #[schemars(description = "Public holidays for the region")]
    #[serde(default)]
    pub holidays: Vec<HolidayDefinition>,

    #[schemars(description = "Inclusive (first, last) year the holiday list covers, if known")]
    #[serde(default)]
    pub holiday_years: Option<(i32, i32)>,
}

fn default_capacity_hours_per_week() -> f64 {
    35.0
}

fn default_working_days_per_week() -> u32 {
    5
}

fn default_capacity_lower_ratio() -> f64 {
    0.8
}

fn default_internal_keywords() -> Vec<String> {
    vec!["internal".to_string(), "persuasion".to_string()]
}

fn default_top_clients() -> usize {
    10
}

/// Unlabelled until a holiday list is configured.
fn default_holiday_region() -> String {
    String::new()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            capacity_hours_per_week: default_capacity_hours_per_week(),
            working_days_per_week: default_working_days_per_week(),
            capacity_lower_ratio: default_capacity_lower_ratio(),
            internal_keywords: default_internal_keywords(),
            top_clients: default_top_clients(),
            holiday_region: default_holiday_region(),
            holidays: Vec::new(),
            holiday_years: None,
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn capacity_hours_per_day(&self) -> f64 {
        self.capacity_hours_per_week / f64::from(self.working_days_per_week)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity_hours_per_week.is_nan() || self.capacity_hours_per_week <= 0.0 {
            return Err(HarvestReportError::InvalidConfig(format!(
                "capacity_hours_per_week must be positive, got {}",
                self.capacity_hours_per_week
            )));
        }

        if !(1..=7).contains(&self.working_days_per_week) {
            return Err(HarvestReportError::InvalidConfig(format!(
                "working_days_per_week must be between 1 and 7, got {}",
                self.working_days_per_week
            )));
        }

        if !(0.0..=1.0).contains(&self.capacity_lower_ratio) {
            return Err(HarvestReportError::InvalidConfig(format!(
                "capacity_lower_ratio must be between 0.0 and 1.0, got {}",
                self.capacity_lower_ratio
            )));
        }

        if self.top_clients == 0 {
            return Err(HarvestReportError::InvalidConfig(
                "top_clients must be at least 1".to_string(),
            ));
        }

        if self.internal_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(HarvestReportError::InvalidConfig(
                "internal_keywords must not contain empty keywords".to_string(),
            ));
        }

        if let Some((first, last)) = self.holiday_years {
            if first > last {
                return Err(HarvestReportError::InvalidConfig(format!(
                    "holiday_years starts at {} but ends at {}",
                    first, last
                )));
            }

            if let Some(outside) = self
                .holidays
                .iter()
                .find(|h| h.date.year() < first || h.date.year() > last)
            {
                return Err(HarvestReportError::InvalidConfig(format!(
                    "holiday '{}' on {} falls outside covered years {}-{}",
                    outside.name, outside.date, first, last
                )));
            }
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
