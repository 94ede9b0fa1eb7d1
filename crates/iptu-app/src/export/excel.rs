//! Excel export functionality

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

use iptu_types::{AnalysisRecord, Error, Result, Status};

use crate::app::query_service::compute_stats;

/// Export analysis records to an Excel file
pub fn export_to_excel(records: &[AnalysisRecord], output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    // Add summary sheet
    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, records)?;

    // Add details sheet
    let details_sheet = workbook.add_worksheet();
    write_details_sheet(details_sheet, records)?;

    // Save workbook
    workbook
        .save(output_path)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, records: &[AnalysisRecord]) -> Result<()> {
    sheet
        .set_name("Summary")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "IPTU Checker Analysis Report", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;

    let stats = compute_stats(records);

    sheet
        .write_string(2, 0, "Total Properties:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(2, 1, stats.total as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(3, 0, "Compliant:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(3, 1, stats.compliant as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(4, 0, "Underdeclared:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(4, 1, stats.underdeclared as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(5, 0, "Overdeclared:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(5, 1, stats.overdeclared as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(6, 0, "Errors:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(6, 1, stats.errors as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(8, 0, "Avg Difference (%):")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(8, 1, stats.avg_percent_difference)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(9, 0, "Potential Evasion Cases:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(9, 1, stats.potential_evasion as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

fn write_details_sheet(sheet: &mut Worksheet, records: &[AnalysisRecord]) -> Result<()> {
    sheet
        .set_name("Details")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();
    let flagged_format = Format::new().set_font_color("#FF0000");

    let headers = [
        "Address",
        "Latitude",
        "Longitude",
        "Registered (m²)",
        "Measured (m²)",
        "Difference (m²)",
        "Difference (%)",
        "Status",
        "Imagery",
        "Method",
        "Analyzed At",
    ];

    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;

        sheet
            .write_string(row, 0, &record.address)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 1, record.latitude)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 2, record.longitude)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 3, record.registered_area)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 4, record.measured_area)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 5, record.difference)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 6, record.percent_difference)
            .map_err(|e| Error::Excel(e.to_string()))?;

        // Highlight potential evasion
        if record.status == Status::Underdeclared {
            sheet
                .write_string_with_format(row, 7, record.status.label(), &flagged_format)
                .map_err(|e| Error::Excel(e.to_string()))?;
        } else {
            sheet
                .write_string(row, 7, record.status.label())
                .map_err(|e| Error::Excel(e.to_string()))?;
        }

        sheet
            .write_string(row, 8, record.imagery_source.label())
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_string(row, 9, record.measurement_method.label())
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_string(row, 10, &record.analyzed_at.to_rfc3339())
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    // Approximate column widths
    sheet
        .set_column_width(0, 40)
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .set_column_width(7, 14)
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .set_column_width(10, 24)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}
