//! Output formatting module

use iptu_types::{AnalysisRecord, AnalysisStats, OutputFormat, Result, Status};

pub fn output_record(output_format: OutputFormat, record: &AnalysisRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(record)?;
        println!("{}", content);
    } else {
        println!("\nAnalysis Result");
        println!("===============");
        println!("Address:         {}", record.address);
        println!(
            "Coordinates:     {:.6}, {:.6}",
            record.latitude, record.longitude
        );
        println!("Registered area: {:.2} m²", record.registered_area);
        println!("Measured area:   {:.2} m²", record.measured_area);

        if record.status != Status::Error {
            println!("Difference:      {:.2} m²", record.difference);
            println!("Difference:      {:+.2}%", record.percent_difference);
        }

        println!("Status:          {}", status_line(record.status));
        println!("Imagery source:  {}", record.imagery_source);
        println!("Method:          {}", record.measurement_method);

        if let Some(ref path) = record.image_path {
            println!("Image:           {}", path);
        }
        if let Some(ref notes) = record.notes {
            println!("Notes:           {}", notes);
        }
    }

    Ok(())
}

pub fn print_records_table(records: &[AnalysisRecord]) {
    println!(
        "{:<36} {:>12} {:>12} {:>9} {:<14} {:<20}",
        "Address", "Declared m²", "Measured m²", "Diff %", "Status", "Analyzed"
    );
    println!("{}", "-".repeat(108));

    for record in records {
        // Char-based truncation; addresses are not ASCII-only
        let address = if record.address.chars().count() > 34 {
            let head: String = record.address.chars().take(31).collect();
            format!("{}...", head)
        } else {
            record.address.clone()
        };

        println!(
            "{:<36} {:>12.2} {:>12.2} {:>8.2}% {:<14} {:<20}",
            address,
            record.registered_area,
            record.measured_area,
            record.percent_difference,
            record.status.label(),
            record.analyzed_at.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn output_stats(output_format: OutputFormat, stats: &AnalysisStats) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!("\nAnalysis Statistics");
        println!("===================");
        println!("Total analyzed:     {}", stats.total);
        println!("Compliant:          {}", stats.compliant);
        println!("Underdeclared:      {}", stats.underdeclared);
        println!("Overdeclared:       {}", stats.overdeclared);
        println!("Errors:             {}", stats.errors);
        println!("Avg difference:     {:+.2}%", stats.avg_percent_difference);
        println!("Potential evasion:  {}", stats.potential_evasion);
    }

    Ok(())
}

fn status_line(status: Status) -> &'static str {
    match status {
        Status::Compliant => "compliant (within tolerance)",
        Status::Underdeclared => "underdeclared (measured > declared)",
        Status::Overdeclared => "overdeclared (measured < declared)",
        Status::Error => "error (declared area is zero)",
    }
}
