use chrono::NaiveDate;
use harvest_report::*;
use std::collections::BTreeMap;

const EXPORT: &str = "\
Date,Client,Project,Project Code,Task,Notes,Hours,Billable?,Invoiced?,First Name,Last Name
2024-03-04,Acme Corp,Website Rebuild,AC-01,Development,Homepage,6.5,Yes,No,Alice,Tan
2024-03-04,Acme Corp,Website Rebuild,AC-01,Project Management,,1.5,No,No,Alice,Tan
2024-03-04,Globex,Data Platform,GX-07,Development,ETL,7.25,Yes,No,Bob,Lim
2024-03-05,Data - Internal,Dashboards,DI-02,Analysis,,3,No,No,Bob,Lim
2024-03-05,PT Internal,Training,PT-01,Training,,2,No,No,Carol,Ng
2024-03-05,Persuasion,Pitch Deck,PS-09,Design,,4,Yes,No,Carol,Ng
2024-03-06,Acme Corp,Website Rebuild,AC-01,Development,,8,Yes,No,Carol,Ng
2024-03-06,Internal,Leave,LV-00,Public Holiday,Hari Raya,8,Yes,No,Alice,Tan
2024-03-07,Globex,Data Platform,GX-07,Development,,5.75,Yes,No,Bob,Lim
2024-03-09,Acme Corp,Website Rebuild,AC-01,Development,Weekend release,2,Yes,No,Alice,Tan
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn load() -> Vec<TimeEntry> {
    load_entries_from_reader(EXPORT.as_bytes()).unwrap()
}

#[test]
fn test_status_hours_partition_total() {
    let result = aggregate(&load());

    let by_status = result.total_billable_hours
        + result.total_non_billable_hours
        + result.total_leave_hours;
    assert!((by_status - result.total_hours).abs() < 1e-9);

    let breakdown: f64 = result.billable_breakdown.values().sum();
    assert!((breakdown - result.total_hours).abs() < 1e-9);

    for member in result.member_hours.values() {
        let parts = member.billable_hours + member.non_billable_hours + member.leave_hours;
        assert!((parts - member.total_hours).abs() < 1e-9);
    }
}

#[test]
fn test_export_totals() {
    let result = aggregate(&load());

    assert_eq!(result.total_members, 3);
    assert!((result.total_hours - 48.0).abs() < 1e-9);
    assert!((result.total_billable_hours - 33.5).abs() < 1e-9);
    assert!((result.total_non_billable_hours - 6.5).abs() < 1e-9);
    assert!((result.total_leave_hours - 8.0).abs() < 1e-9);
    assert_eq!(result.date_range, Some((date(2024, 3, 4), date(2024, 3, 9))));
}

#[test]
fn test_internal_clients_are_merged() {
    let result = aggregate(&load());

    let clients: Vec<&str> = result.client_hours.keys().map(String::as_str).collect();
    assert_eq!(clients, vec!["Acme Corp", "Globex", "Internal"]);
    assert!((result.client_hours["Internal"] - 17.0).abs() < 1e-9);
    assert!((result.client_status("Internal", BillableStatus::Leave) - 8.0).abs() < 1e-9);
}

#[test]
fn test_holiday_task_is_leave_for_member() {
    let result = aggregate(&load());
    let alice = &result.member_hours["Alice"];

    assert!((alice.leave_hours - 8.0).abs() < 1e-9);
    assert!((alice.billable_hours - 8.5).abs() < 1e-9);
    assert!((alice.total_hours - 18.0).abs() < 1e-9);
    assert!((alice.billable_percentage.unwrap() - 8.5 / 18.0).abs() < 1e-9);
}

#[test]
fn test_two_row_example() {
    let entries = vec![
        TimeEntry::new(date(2024, 1, 1), "Acme", "Alice", "Dev", "Yes", 8.0),
        TimeEntry::new(date(2024, 1, 1), "Acme", "Alice", "Admin", "No", 2.0),
    ];
    let result = aggregate(&entries);

    assert!((result.total_hours - 10.0).abs() < 1e-9);
    assert!((result.total_billable_hours - 8.0).abs() < 1e-9);
    assert!((result.total_non_billable_hours - 2.0).abs() < 1e-9);
    assert!((result.member_hours["Alice"].billable_percentage.unwrap() - 0.8).abs() < 1e-9);
}

#[test]
fn test_status_is_deterministic() {
    let entries = load();
    for entry in &entries {
        assert_eq!(compute_billable_status(entry), compute_billable_status(entry));
        if entry.task.contains("Holiday") {
            assert_eq!(compute_billable_status(entry), BillableStatus::Leave);
        }
    }
}

#[test]
fn test_filter_without_matches_behaves_like_empty_input() {
    let entries = load();
    let aggregator = Aggregator::default();
    let filter = EntryFilter {
        client: Some("Umbrella".to_string()),
        ..EntryFilter::default()
    };

    let filtered = aggregator.aggregate(&aggregator.filter(&entries, &filter));
    let empty = aggregator.aggregate(&[]);

    assert_eq!(filtered, empty);
    assert_eq!(filtered.total_members, 0);
    assert_eq!(filtered.total_hours, 0.0);
}

#[test]
fn test_per_client_filters_reproduce_client_hours() {
    let entries = load();
    let aggregator = Aggregator::default();
    let full = aggregator.aggregate(&entries);

    let mut rebuilt: BTreeMap<String, f64> = BTreeMap::new();
    for client in aggregator.filter_options(&entries).clients {
        let filter = EntryFilter {
            client: Some(client),
            ..EntryFilter::default()
        };
        let partial = aggregator.aggregate(&aggregator.filter(&entries, &filter));
        for (name, hours) in partial.client_hours {
            *rebuilt.entry(name).or_insert(0.0) += hours;
        }
    }

    assert_eq!(rebuilt, full.client_hours);
}

#[test]
fn test_pivot_spans_only_logged_dates() {
    let pivot = aggregate(&load()).member_date_pivot;

    let dates: Vec<NaiveDate> = pivot.dates().collect();
    assert_eq!(
        dates,
        vec![
            date(2024, 3, 4),
            date(2024, 3, 5),
            date(2024, 3, 6),
            date(2024, 3, 7),
            date(2024, 3, 9)
        ]
    );
    assert!((pivot.get("Alice", date(2024, 3, 4)) - 8.0).abs() < 1e-9);
    assert_eq!(pivot.get("Alice", date(2024, 3, 5)), 0.0);
    assert_eq!(pivot.get("Alice", date(2024, 3, 8)), 0.0);
    assert_eq!(pivot.get("Dave", date(2024, 3, 4)), 0.0);
}

#[test]
fn test_report_from_export() {
    let config = ReportConfig {
        top_clients: 2,
        holidays: vec![HolidayDefinition {
            date: date(2024, 3, 6),
            name: "Hari Raya (example)".to_string(),
        }],
        ..ReportConfig::default()
    };

    let report = HarvestReportProcessor::process(&load(), &EntryFilter::default(), &config).unwrap();

    assert_eq!(report.headline.total_employees, 3);
    assert_eq!(report.headline.total_hours, 48.0);
    assert_eq!(report.top_clients.len(), 2);
    assert_eq!(report.top_clients[0].client, "Acme Corp");
    assert_eq!(report.top_clients[0].hours, 18.0);
    assert_eq!(report.top_clients[1].client, "Internal");

    // 4 Mar (Mon) .. 9 Mar (Sat): five weekdays at 7 hours
    let capacity = report.capacity.unwrap();
    assert_eq!(capacity.weekdays, 5);
    assert!((capacity.upper_bound - 35.0).abs() < 1e-9);

    assert_eq!(report.calendar.len(), 6);
    assert!(report.calendar[2].is_holiday);
    assert!(report.calendar[5].is_weekend);
    assert!(!report.calendar[4].is_weekend);

    let employees: Vec<&str> = report.member_rows.iter().map(|r| r.employee.as_str()).collect();
    assert_eq!(employees, vec!["Alice", "Bob", "Carol"]);
}

#[test]
fn test_employee_and_status_filters() {
    let entries = load();
    let config = ReportConfig::default();

    let bob = EntryFilter {
        employee: Some("Bob".to_string()),
        ..EntryFilter::default()
    };
    let report = HarvestReportProcessor::process(&entries, &bob, &config).unwrap();
    assert_eq!(report.headline.total_employees, 1);
    assert_eq!(report.headline.total_hours, 16.0);

    let leave_only = EntryFilter {
        status: Some(BillableStatus::Leave),
        ..EntryFilter::default()
    };
    let report = HarvestReportProcessor::process(&entries, &leave_only, &config).unwrap();
    assert_eq!(report.headline.total_leave_hours, 8.0);
    assert_eq!(report.headline.total_billable_hours, 0.0);
    assert_eq!(report.billable_donut.len(), 1);
}

#[test]
fn test_schema_error_aborts_load() {
    let without_hours = "Date,Client,First Name,Task,Billable?\n2024-03-04,Acme,Alice,Dev,Yes\n";
    let err = load_entries_from_reader(without_hours.as_bytes()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Required column 'Hours' is missing from the timesheet export"
    );
}

#[test]
fn test_config_round_trip_through_json_file() {
    let dir = std::env::temp_dir().join("harvest_report_config_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(
        &path,
        r#"{
            "capacity_hours_per_week": 40,
            "internal_keywords": ["internal", "persuasion", "overhead"],
            "holiday_years": [2022, 2029],
            "holidays": [{"date": "2024-05-01", "name": "Labour Day"}]
        }"#,
    )
    .unwrap();

    let config = ReportConfig::from_json_file(&path).unwrap();
    assert!((config.capacity_hours_per_day() - 8.0).abs() < 1e-9);
    assert_eq!(config.internal_keywords.len(), 3);
    assert_eq!(config.top_clients, 10);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_report_carries_member_date_pivot() {
    let entries = vec![TimeEntry::new(date(2024, 1, 1), "Acme", "Zelda", "Dev", "Yes", 7.25)];
    let report =
        HarvestReportProcessor::process(&entries, &EntryFilter::default(), &ReportConfig::default())
            .unwrap();

    let pivot = &report.member_date_pivot;
    assert!((pivot.get("Zelda", date(2024, 1, 1)) - 7.25).abs() < 1e-9);
    assert_eq!(pivot.get("Zelda", date(2024, 1, 2)), 0.0);

    let json = report.to_json().unwrap();
    assert!(json.contains("\"member_date_pivot\""));
    assert!(json.contains("Zelda"));
}

#[test]
fn test_filtered_report_pivot_keeps_only_selection() {
    let bob = EntryFilter {
        employee: Some("Bob".to_string()),
        ..EntryFilter::default()
    };
    let report = HarvestReportProcessor::process(&load(), &bob, &ReportConfig::default()).unwrap();

    let employees: Vec<&str> = report.member_date_pivot.employees().collect();
    assert_eq!(employees, vec!["Bob"]);
    assert_eq!(report.member_date_pivot.row("Bob"), vec![7.25, 3.0, 5.75]);
}

#[test]
fn test_process_csv_file() {
    let dir = std::env::temp_dir().join("harvest_report_csv_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("harvest_time_report.csv");
    std::fs::write(&path, EXPORT).unwrap();

    let entries = load_entries_from_path(&path).unwrap();
    assert_eq!(entries.len(), 10);

    let report =
        HarvestReportProcessor::process_csv_file(&path, &EntryFilter::default(), &ReportConfig::default())
            .unwrap();
    assert_eq!(report.headline.total_employees, 3);
    assert_eq!(report.headline.total_hours, 48.0);
    assert!((report.member_date_pivot.get("Alice", date(2024, 3, 9)) - 2.0).abs() < 1e-9);

    std::fs::remove_file(&path).ok();

    assert!(matches!(
        HarvestReportProcessor::process_csv_file(&path, &EntryFilter::default(), &ReportConfig::default()),
        Err(HarvestReportError::IoError(_))
    ));
}
