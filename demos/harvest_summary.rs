use harvest_report::{
    load_entries_from_path, BillableStatus, EntryFilter, HarvestReportProcessor, ReportConfig,
};

/// Usage: harvest_summary <export.csv> [client] [employee] [config.json]
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: harvest_summary <export.csv> [client] [employee] [config.json]"))?;
    let client = args.next().filter(|s| !s.is_empty());
    let employee = args.next().filter(|s| !s.is_empty());
    let config = match args.next() {
        Some(config_path) => ReportConfig::from_json_file(config_path)?,
        None => ReportConfig::default(),
    };

    let entries = load_entries_from_path(&path)?;
    let options = HarvestReportProcessor::filter_options(&entries, &config);
    if let Some((start, end)) = options.date_range {
        println!("Date range: {} - {}", start, end);
    }
    println!("Clients: {}", options.clients.join(", "));
    println!("Employees: {}", options.employees.join(", "));

    let filter = EntryFilter {
        client,
        employee,
        status: None,
    };
    let report = HarvestReportProcessor::process(&entries, &filter, &config)?;

    if !report.has_data {
        println!("No time entries match this selection.");
        return Ok(());
    }

    let headline = &report.headline;
    println!();
    println!("Total Employee:          {}", headline.total_employees);
    println!("Total Hour:              {:.2}", headline.total_hours);
    println!("Total Billable Hour:     {:.2}", headline.total_billable_hours);
    println!("Total Non-billable Hour: {:.2}", headline.total_non_billable_hours);

    println!("\nClient Hours");
    for bar in &report.top_clients {
        println!("  {:<30} {:>8.2}", bar.client, bar.hours);
    }

    println!("\nEmployee Hours");
    for row in &report.member_rows {
        let pct = row
            .billable_percentage
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<15} {:>7.2}h total, {:>7.2}h {}, {} billable",
            row.employee,
            row.total_hours,
            row.leave_hours,
            BillableStatus::Leave,
            pct
        );
    }

    println!("\nEmployee x Date");
    report.member_date_pivot.write_csv(std::io::stdout())?;

    if let Some(capacity) = &report.capacity {
        println!(
            "\nCapacity over {} weekdays: {:.1}h (enough at {:.1}h)",
            capacity.weekdays, capacity.upper_bound, capacity.lower_bound
        );
    }

    Ok(())
}
