//! # Harvest Report
//!
//! A library for turning a Harvest detailed time export (CSV) into the numbers
//! behind a billable-hours report: totals by billable status, hours per client
//! and per employee, a task detail table and an employee × date pivot.
//!
//! ## Core Concepts
//!
//! - **Time Entry**: One CSV row (date, client, first name, task, billable flag, hours)
//! - **Billable Status**: Billable, Non-Billable or Leave. Any task containing
//!   "Holiday" is Leave regardless of its billable flag
//! - **Client Normalization**: Internal projects collapse into a single "Internal" client
//! - **Aggregation**: Every view is recomputed from scratch for each filter selection
//! - **Presentation Boundary**: Rounding and ordering happen only in [`report`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use harvest_report::*;
//!
//! let filter = EntryFilter {
//!     client: Some("Acme Corp".to_string()),
//!     ..EntryFilter::default()
//! };
//!
//! let report = HarvestReportProcessor::process_csv_file(
//!     "harvest_time_report.csv",
//!     &filter,
//!     &ReportConfig::default(),
//! )
//! .unwrap();
//!
//! println!("Total hours: {}", report.headline.total_hours);
//! ```

pub mod calendar;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod normalizer;
pub mod report;
pub mod schema;
pub mod utils;

pub use calendar::{annotate, CalendarDay, FixedHolidayCalendar, HolidayCalendar};
pub use engine::{
    aggregate, compute_billable_status, AggregationResult, Aggregator, ClientStatusHours,
    FilterOptions, MemberDatePivot, MemberHours, TaskHours,
};
pub use error::{HarvestReportError, Result};
pub use ingestion::{load_entries_from_path, load_entries_from_reader, REQUIRED_COLUMNS};
pub use normalizer::{normalize, ClientNormalizer, INTERNAL_CLIENT};
pub use report::{
    CapacityMeter, ClientBar, ClientBreakdown, DonutSlice, HarvestReport, HeadlineMetrics,
    MemberRow,
};
pub use schema::*;
pub use utils::*;

use log::{debug, info};
use std::path::Path;

pub struct HarvestReportProcessor;

impl HarvestReportProcessor {
    /// Filters, aggregates and lays out one report. Nothing is cached between calls.
    pub fn process(
        entries: &[TimeEntry],
        filter: &EntryFilter,
        config: &ReportConfig,
    ) -> Result<HarvestReport> {
        config.validate()?;
        let calendar = FixedHolidayCalendar::from_config(config)?;

        info!(
            "Building harvest report from {} entries (filter: {:?})",
            entries.len(),
            filter
        );

        let aggregator = Aggregator::from_config(config);
        let selected = aggregator.filter(entries, filter);

        if selected.is_empty() {
            info!("No entries match the current selection");
        }

        let result = aggregator.aggregate(&selected);
        debug!(
            "Totals: {:.2} hours ({:.2} billable, {:.2} non-billable, {:.2} leave) across {} members",
            result.total_hours,
            result.total_billable_hours,
            result.total_non_billable_hours,
            result.total_leave_hours,
            result.total_members
        );

        Ok(HarvestReport::build(&result, config, &calendar))
    }

    pub fn process_csv_file<P: AsRef<Path>>(
        path: P,
        filter: &EntryFilter,
        config: &ReportConfig,
    ) -> Result<HarvestReport> {
        let entries = load_entries_from_path(path)?;
        Self::process(&entries, filter, config)
    }

    pub fn filter_options(entries: &[TimeEntry], config: &ReportConfig) -> FilterOptions {
        Aggregator::from_config(config).filter_options(entries)
    }
}

pub fn process_harvest_report(
    entries: &[TimeEntry],
    filter: &EntryFilter,
    config: &ReportConfig,
) -> Result<HarvestReport> {
    HarvestReportProcessor::process(entries, filter, config)
}
