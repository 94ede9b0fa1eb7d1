//! Export of analysis records to Excel, CSV and JSON

mod excel;

pub use excel::export_to_excel;

use std::path::Path;

use iptu_types::{AnalysisRecord, Error, Result};

/// Export records to a CSV file
pub fn export_to_csv(records: &[AnalysisRecord], output_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path).map_err(|e| Error::CsvLoader(e.to_string()))?;

    writer
        .write_record([
            "id",
            "address",
            "latitude",
            "longitude",
            "registered_area_m2",
            "measured_area_m2",
            "difference_m2",
            "percent_difference",
            "status",
            "imagery_source",
            "measurement_method",
            "analyzed_at",
        ])
        .map_err(|e| Error::CsvLoader(e.to_string()))?;

    for record in records {
        writer
            .write_record([
                record.id.as_str(),
                record.address.as_str(),
                &record.latitude.to_string(),
                &record.longitude.to_string(),
                &record.registered_area.to_string(),
                &record.measured_area.to_string(),
                &record.difference.to_string(),
                &record.percent_difference.to_string(),
                record.status.label(),
                record.imagery_source.label(),
                record.measurement_method.label(),
                &record.analyzed_at.to_rfc3339(),
            ])
            .map_err(|e| Error::CsvLoader(e.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Export records to a pretty-printed JSON file
pub fn export_to_json(records: &[AnalysisRecord], output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}
