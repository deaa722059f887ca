//! Presentation boundary.
//!
//! Everything here is derived from an [`AggregationResult`]: rounding to two
//! decimals, display ordering, top-N truncation and chart-ready series. The
//! engine itself never rounds.

use crate::calendar::{annotate, CalendarDay, HolidayCalendar};
use crate::engine::{AggregationResult, MemberDatePivot, TaskHours};
use crate::error::Result;
use crate::schema::{BillableStatus, ReportConfig};
use crate::utils::{count_weekdays, round2, safe_ratio};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub total_employees: usize,
    pub total_hours: f64,
    pub total_billable_hours: f64,
    pub total_non_billable_hours: f64,
    pub total_leave_hours: f64,
}

impl HeadlineMetrics {
    pub fn from_result(result: &AggregationResult) -> Self {
        Self {
            total_employees: result.total_members,
            total_hours: round2(result.total_hours),
            total_billable_hours: round2(result.total_billable_hours),
            total_non_billable_hours: round2(result.total_non_billable_hours),
            total_leave_hours: round2(result.total_leave_hours),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutSlice {
    pub status: BillableStatus,
    pub label: String,
    pub hours: f64,
    /// Fraction of all hours, `None` when nothing was logged
    pub share: Option<f64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBar {
    pub client: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBreakdown {
    pub client: String,
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub leave_hours: f64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRow {
    pub employee: String,
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub leave_hours: f64,
    pub total_hours: f64,
    pub billable_percentage: Option<f64>,
    pub non_billable_percentage: Option<f64>,
}

/// Expected-hours band drawn across the member breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityMeter {
    pub weekdays: u32,
    pub upper_bound: f64,
    pub lower_bound: f64,
}

impl CapacityMeter {
    pub fn for_range(start: NaiveDate, end: NaiveDate, config: &ReportConfig) -> Self {
        let weekdays = count_weekdays(start, end);
        let upper_bound = f64::from(weekdays) * config.capacity_hours_per_day();
        Self {
            weekdays,
            upper_bound,
            lower_bound: upper_bound * config.capacity_lower_ratio,
        }
    }

    /// Whether `hours` falls inside the [lower, upper] band.
    pub fn is_within(&self, hours: f64) -> bool {
        hours >= self.lower_bound && hours <= self.upper_bound
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub has_data: bool,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub headline: HeadlineMetrics,
    pub billable_donut: Vec<DonutSlice>,
    pub top_clients: Vec<ClientBar>,
    pub client_breakdown: Vec<ClientBreakdown>,
    pub member_rows: Vec<MemberRow>,
    pub task_table: Vec<TaskHours>,
    /// Employee × date hours, unrounded; absent pairs read as zero
    pub member_date_pivot: MemberDatePivot,
    pub capacity: Option<CapacityMeter>,
    pub calendar: Vec<CalendarDay>,
}

impl HarvestReport {
    pub fn build(
        result: &AggregationResult,
        config: &ReportConfig,
        calendar: &dyn HolidayCalendar,
    ) -> Self {
        let (capacity, days) = match result.date_range {
            Some((start, end)) => (
                Some(CapacityMeter::for_range(start, end, config)),
                annotate(calendar, start, end),
            ),
            None => (None, Vec::new()),
        };

        Self {
            has_data: !result.is_empty(),
            date_range: result.date_range,
            headline: HeadlineMetrics::from_result(result),
            billable_donut: billable_donut(result),
            top_clients: top_clients(result, config.top_clients),
            client_breakdown: client_breakdown(result),
            member_rows: member_rows(result),
            task_table: task_table(result),
            member_date_pivot: result.member_date_pivot.clone(),
            capacity,
            calendar: days,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn billable_donut(result: &AggregationResult) -> Vec<DonutSlice> {
    result
        .billable_breakdown
        .iter()
        .map(|(status, hours)| DonutSlice {
            status: *status,
            label: status.label().to_string(),
            hours: round2(*hours),
            share: safe_ratio(*hours, result.total_hours),
            color: status.color().to_string(),
        })
        .collect()
}

fn by_hours_desc(a_hours: f64, a_name: &str, b_hours: f64, b_name: &str) -> Ordering {
    b_hours
        .partial_cmp(&a_hours)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_name.cmp(b_name))
}

/// The `limit` busiest clients, most hours first.
pub fn top_clients(result: &AggregationResult, limit: usize) -> Vec<ClientBar> {
    let mut clients: Vec<(&String, f64)> =
        result.client_hours.iter().map(|(c, h)| (c, *h)).collect();
    clients.sort_by(|a, b| by_hours_desc(a.1, a.0, b.1, b.0));

    clients
        .into_iter()
        .take(limit)
        .map(|(client, hours)| ClientBar {
            client: client.clone(),
            hours: round2(hours),
        })
        .collect()
}

pub fn client_breakdown(result: &AggregationResult) -> Vec<ClientBreakdown> {
    let mut rows: Vec<ClientBreakdown> = result
        .client_hours
        .iter()
        .map(|(client, total)| ClientBreakdown {
            client: client.clone(),
            billable_hours: round2(result.client_status(client, BillableStatus::Billable)),
            non_billable_hours: round2(result.client_status(client, BillableStatus::NonBillable)),
            leave_hours: round2(result.client_status(client, BillableStatus::Leave)),
            total_hours: round2(*total),
        })
        .collect();

    rows.sort_by(|a, b| by_hours_desc(a.total_hours, &a.client, b.total_hours, &b.client));
    rows
}

/// Alphabetical by employee.
pub fn member_rows(result: &AggregationResult) -> Vec<MemberRow> {
    result
        .member_hours
        .iter()
        .map(|(employee, m)| MemberRow {
            employee: employee.clone(),
            billable_hours: round2(m.billable_hours),
            non_billable_hours: round2(m.non_billable_hours),
            leave_hours: round2(m.leave_hours),
            total_hours: round2(m.total_hours),
            billable_percentage: m.billable_percentage,
            non_billable_percentage: m.non_billable_percentage,
        })
        .collect()
}

/// Billable rows first, then non-billable, then leave; busiest tasks first
/// within each status.
pub fn task_table(result: &AggregationResult) -> Vec<TaskHours> {
    let mut rows: Vec<TaskHours> = result
        .task_summary
        .iter()
        .map(|t| TaskHours {
            hours: round2(t.hours),
            ..t.clone()
        })
        .collect();

    rows.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| b.hours.partial_cmp(&a.hours).unwrap_or(Ordering::Equal))
            .then_with(|| a.client.cmp(&b.client))
            .then_with(|| a.task.cmp(&b.task))
    });
    rows
}
