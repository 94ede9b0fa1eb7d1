//! CSV loader for property batch files
//!
//! Accepts UTF-8 input and falls back to Windows-1252 for files exported
//! from legacy municipal systems.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use iptu_types::PropertyInput;

#[derive(Error, Debug)]
pub enum CsvLoaderError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Empty address in row {row}")]
    EmptyAddress { row: usize },

    #[error("Invalid number format in row {row}, column {column}: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// Load properties from a CSV file.
///
/// Expected CSV header:
/// address,registered_area[,owner]
pub fn load_properties_from_csv<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<PropertyInput>, CsvLoaderError> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let decoded = decode_bytes(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(decoded.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers)?;

    let mut properties = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row_num = row_idx + 2; // header is row 1

        properties.push(parse_record(&record, &columns, row_num)?);
    }

    Ok(properties)
}

/// Decode UTF-8 when valid, otherwise assume Windows-1252
fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, had_errors) = WINDOWS_1252.decode(bytes);
            if had_errors {
                eprintln!("Warning: Some characters could not be decoded from Windows-1252");
            }
            decoded.into_owned()
        }
    }
}

struct Columns {
    address: usize,
    registered_area: usize,
    owner: Option<usize>,
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<Columns, CsvLoaderError> {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let address = find("address")
        .or_else(|| find("endereco"))
        .ok_or_else(|| CsvLoaderError::MissingColumn("address".to_string()))?;
    let registered_area = find("registered_area")
        .or_else(|| find("area_declarada"))
        .ok_or_else(|| CsvLoaderError::MissingColumn("registered_area".to_string()))?;
    let owner = find("owner").or_else(|| find("proprietario"));

    Ok(Columns {
        address,
        registered_area,
        owner,
    })
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &Columns,
    row_num: usize,
) -> Result<PropertyInput, CsvLoaderError> {
    let address = record.get(columns.address).unwrap_or("").to_string();
    if address.is_empty() {
        return Err(CsvLoaderError::EmptyAddress { row: row_num });
    }

    let registered_area = parse_f64(
        record.get(columns.registered_area).unwrap_or("0"),
        row_num,
        "registered_area",
    )?;

    let owner = columns
        .owner
        .and_then(|idx| record.get(idx))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(PropertyInput {
        address,
        registered_area,
        owner,
    })
}

fn parse_f64(s: &str, row: usize, column: &str) -> Result<f64, CsvLoaderError> {
    let cleaned = s.trim().replace(',', ".");
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    cleaned.parse().map_err(|_| CsvLoaderError::InvalidNumber {
        row,
        column: column.to_string(),
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_load_basic_file() {
        let file = write_csv(
            b"address,registered_area,owner\n\
              \"Av. Paulista, 1578\",350.0,Maria Silva\n\
              \"Rua Augusta, 500\",120.5,\n",
        );

        let properties = load_properties_from_csv(file.path()).unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].address, "Av. Paulista, 1578");
        assert_eq!(properties[0].registered_area, 350.0);
        assert_eq!(properties[0].owner.as_deref(), Some("Maria Silva"));
        assert_eq!(properties[1].owner, None);
    }

    #[test]
    fn test_owner_column_is_optional() {
        let file = write_csv(b"address,registered_area\nRua A,80\n");

        let properties = load_properties_from_csv(file.path()).unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].registered_area, 80.0);
        assert_eq!(properties[0].owner, None);
    }

    #[test]
    fn test_missing_address_column() {
        let file = write_csv(b"street,registered_area\nRua A,80\n");

        let err = load_properties_from_csv(file.path()).unwrap_err();
        assert!(matches!(err, CsvLoaderError::MissingColumn(col) if col == "address"));
    }

    #[test]
    fn test_empty_address_is_rejected() {
        let file = write_csv(b"address,registered_area\n,80\n");

        let err = load_properties_from_csv(file.path()).unwrap_err();
        assert!(matches!(err, CsvLoaderError::EmptyAddress { row: 2 }));
    }

    #[test]
    fn test_comma_decimal_separator() {
        let file = write_csv(b"address,registered_area\nRua A,\"120,5\"\n");

        let properties = load_properties_from_csv(file.path()).unwrap();
        assert_eq!(properties[0].registered_area, 120.5);
    }

    #[test]
    fn test_invalid_number() {
        let file = write_csv(b"address,registered_area\nRua A,abc\n");

        let err = load_properties_from_csv(file.path()).unwrap_err();
        assert!(matches!(err, CsvLoaderError::InvalidNumber { row: 2, .. }));
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "São Paulo" with 0xE3 for ã, invalid as UTF-8
        let file = write_csv(b"address,registered_area\nRua S\xE3o Jo\xE3o,90\n");

        let properties = load_properties_from_csv(file.path()).unwrap();
        assert_eq!(properties[0].address, "Rua São João");
    }

    #[test]
    fn test_portuguese_headers() {
        let file = write_csv(b"endereco,area_declarada,proprietario\nRua A,100,Jose\n");

        let properties = load_properties_from_csv(file.path()).unwrap();
        assert_eq!(properties[0].registered_area, 100.0);
        assert_eq!(properties[0].owner.as_deref(), Some("Jose"));
    }
}
