use crate::normalizer::ClientNormalizer;
use crate::schema::{BillableStatus, EntryFilter, ReportConfig, TimeEntry};
use crate::utils::safe_ratio;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Derives the three-way billable status of an entry.
pub fn compute_billable_status(entry: &TimeEntry) -> BillableStatus {
    entry.status()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberHours {
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub leave_hours: f64,
    pub total_hours: f64,
    /// `billable_hours / total_hours`, `None` when no hours were logged
    pub billable_percentage: Option<f64>,
    pub non_billable_percentage: Option<f64>,
    pub leave_percentage: Option<f64>,
}

impl MemberHours {
    fn add(&mut self, status: BillableStatus, hours: f64) {
        match status {
            BillableStatus::Billable => self.billable_hours += hours,
            BillableStatus::NonBillable => self.non_billable_hours += hours,
            BillableStatus::Leave => self.leave_hours += hours,
        }
        self.total_hours += hours;
    }

    fn finish(&mut self) {
        self.billable_percentage = safe_ratio(self.billable_hours, self.total_hours);
        self.non_billable_percentage = safe_ratio(self.non_billable_hours, self.total_hours);
        self.leave_percentage = safe_ratio(self.leave_hours, self.total_hours);
    }

    pub fn hours_for(&self, status: BillableStatus) -> f64 {
        match status {
            BillableStatus::Billable => self.billable_hours,
            BillableStatus::NonBillable => self.non_billable_hours,
            BillableStatus::Leave => self.leave_hours,
        }
    }

    pub fn percentage_for(&self, status: BillableStatus) -> Option<f64> {
        match status {
            BillableStatus::Billable => self.billable_percentage,
            BillableStatus::NonBillable => self.non_billable_percentage,
            BillableStatus::Leave => self.leave_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStatusHours {
    pub client: String,
    pub status: BillableStatus,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHours {
    pub client: String,
    pub task: String,
    pub status: BillableStatus,
    pub hours: f64,
}

/// Employee × date hour sums. Only pairs with at least one entry are stored;
/// any other pair reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberDatePivot {
    cells: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
    dates: BTreeSet<NaiveDate>,
}

impl MemberDatePivot {
    fn add(&mut self, employee: &str, date: NaiveDate, hours: f64) {
        *self
            .cells
            .entry(employee.to_string())
            .or_default()
            .entry(date)
            .or_insert(0.0) += hours;
        self.dates.insert(date);
    }

    pub fn get(&self, employee: &str, date: NaiveDate) -> f64 {
        self.cells
            .get(employee)
            .and_then(|row| row.get(&date))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn employees(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Dates that carry at least one entry, ascending. Not calendar-continuous.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// One value per pivot date, zero-filled.
    pub fn row(&self, employee: &str) -> Vec<f64> {
        self.dates.iter().map(|d| self.get(employee, *d)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Writes the zero-filled table as CSV: `First Name` then one column per date.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> crate::error::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["First Name".to_string()];
        header.extend(self.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()));
        csv_writer.write_record(&header)?;

        for employee in self.employees() {
            let mut record = vec![employee.to_string()];
            record.extend(self.row(employee).into_iter().map(|h| h.to_string()));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Every derived view over one set of entries. Sums are unrounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub total_members: usize,
    pub total_hours: f64,
    pub total_billable_hours: f64,
    pub total_non_billable_hours: f64,
    pub total_leave_hours: f64,
    pub billable_breakdown: BTreeMap<BillableStatus, f64>,
    pub client_hours: BTreeMap<String, f64>,
    pub client_status_hours: Vec<ClientStatusHours>,
    pub member_hours: BTreeMap<String, MemberHours>,
    pub member_date_pivot: MemberDatePivot,
    pub task_summary: Vec<TaskHours>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.member_hours.is_empty()
    }

    pub fn client_status(&self, client: &str, status: BillableStatus) -> f64 {
        self.client_status_hours
            .iter()
            .find(|row| row.client == client && row.status == status)
            .map(|row| row.hours)
            .unwrap_or(0.0)
    }
}

/// Distinct values available to the client and employee selectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub clients: Vec<String>,
    pub employees: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

pub struct Aggregator {
    normalizer: ClientNormalizer,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(ClientNormalizer::default())
    }
}

impl Aggregator {
    pub fn new(normalizer: ClientNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(ClientNormalizer::from_config(config))
    }

    pub fn normalizer(&self) -> &ClientNormalizer {
        &self.normalizer
    }

    pub fn matches(&self, entry: &TimeEntry, filter: &EntryFilter) -> bool {
        if let Some(client) = &filter.client {
            if self.normalizer.normalize(&entry.client) != *client {
                return false;
            }
        }

        if let Some(employee) = &filter.employee {
            if entry.first_name != *employee {
                return false;
            }
        }

        if let Some(status) = filter.status {
            if entry.status() != status {
                return false;
            }
        }

        true
    }

    /// Keeps matching entries in their original order.
    pub fn filter(&self, entries: &[TimeEntry], filter: &EntryFilter) -> Vec<TimeEntry> {
        if filter.is_empty() {
            return entries.to_vec();
        }

        let kept: Vec<TimeEntry> = entries
            .iter()
            .filter(|e| self.matches(e, filter))
            .cloned()
            .collect();

        debug!(
            "Filter {:?} kept {} of {} entries",
            filter,
            kept.len(),
            entries.len()
        );
        kept
    }

    pub fn filter_options(&self, entries: &[TimeEntry]) -> FilterOptions {
        let clients: BTreeSet<String> = entries
            .iter()
            .map(|e| self.normalizer.normalize(&e.client))
            .collect();
        let employees: BTreeSet<&str> = entries.iter().map(|e| e.first_name.as_str()).collect();

        FilterOptions {
            clients: clients.into_iter().collect(),
            employees: employees.into_iter().map(str::to_string).collect(),
            date_range: date_range(entries),
        }
    }

    /// Computes every view from scratch. Hours accumulate in input order, so
    /// any order-preserving subset yields bit-identical per-group sums.
    pub fn aggregate(&self, entries: &[TimeEntry]) -> AggregationResult {
        let mut result = AggregationResult {
            date_range: date_range(entries),
            ..AggregationResult::default()
        };

        let mut client_status: BTreeMap<(String, BillableStatus), f64> = BTreeMap::new();
        let mut tasks: BTreeMap<(String, String, BillableStatus), f64> = BTreeMap::new();

        for entry in entries {
            let status = compute_billable_status(entry);
            let client = self.normalizer.normalize(&entry.client);
            let hours = entry.hours;

            result.total_hours += hours;
            match status {
                BillableStatus::Billable => result.total_billable_hours += hours,
                BillableStatus::NonBillable => result.total_non_billable_hours += hours,
                BillableStatus::Leave => result.total_leave_hours += hours,
            }
            *result.billable_breakdown.entry(status).or_insert(0.0) += hours;

            *result.client_hours.entry(client.clone()).or_insert(0.0) += hours;
            *client_status.entry((client.clone(), status)).or_insert(0.0) += hours;
            *tasks
                .entry((client, entry.task.clone(), status))
                .or_insert(0.0) += hours;

            result
                .member_hours
                .entry(entry.first_name.clone())
                .or_default()
                .add(status, hours);

            result
                .member_date_pivot
                .add(&entry.first_name, entry.date, hours);
        }

        for (name, member) in result.member_hours.iter_mut() {
            member.finish();
            if member.billable_percentage.is_none() {
                warn!("Employee '{}' logged zero hours; percentages are undefined", name);
            }
        }

        result.total_members = result.member_hours.len();

        result.client_status_hours = client_status
            .into_iter()
            .map(|((client, status), hours)| ClientStatusHours {
                client,
                status,
                hours,
            })
            .collect();

        result.task_summary = tasks
            .into_iter()
            .map(|((client, task, status), hours)| TaskHours {
                client,
                task,
                status,
                hours,
            })
            .collect();

        debug!(
            "Aggregated {} entries: {} members, {} clients, {:.2} hours",
            entries.len(),
            result.total_members,
            result.client_hours.len(),
            result.total_hours
        );

        result
    }
}

/// Aggregates with the default client normalization.
pub fn aggregate(entries: &[TimeEntry]) -> AggregationResult {
    Aggregator::default().aggregate(entries)
}

pub fn date_range(entries: &[TimeEntry]) -> Option<(NaiveDate, NaiveDate)> {
    let min = entries.iter().map(|e| e.date).min()?;
    let max = entries.iter().map(|e| e.date).max()?;
    Some((min, max))
}
