// 💾 Export / Import - raw collection to and from files
// JSON mirrors the dashboard's "Export Data" download; CSV is for spreadsheets.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::entry::Entry;

/// Download name used by the dashboard's export button
pub const EXPORT_FILE_NAME: &str = "ad-spend-data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Guess from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> ExportFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Pretty-printed JSON array (2-space indent)
pub fn to_json(entries: &[Entry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("Failed to serialize entries")
}

pub fn write_csv<W: Write>(writer: W, entries: &[Entry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(entry).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn export_to_path(path: &Path, format: ExportFormat, entries: &[Entry]) -> Result<()> {
    match format {
        ExportFormat::Json => {
            let json = to_json(entries)?;
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        ExportFormat::Csv => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(file, entries)?;
        }
    }
    Ok(())
}

/// Accepts a bare array (dashboard export) or an API response body
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonImport {
    Bare(Vec<Entry>),
    Wrapped { entries: Vec<Entry> },
}

pub fn from_json(text: &str) -> Result<Vec<Entry>> {
    let parsed: JsonImport = serde_json::from_str(text).context("Failed to parse entries JSON")?;
    Ok(match parsed {
        JsonImport::Bare(entries) => entries,
        JsonImport::Wrapped { entries } => entries,
    })
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Entry>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();
    for result in rdr.deserialize() {
        let entry: Entry = result.context("Failed to deserialize entry")?;
        entries.push(entry);
    }
    Ok(entries)
}

pub fn import_from_path(path: &Path) -> Result<Vec<Entry>> {
    match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            from_json(&text)
        }
        ExportFormat::Csv => {
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_csv(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::MediaType;

    fn entries() -> Vec<Entry> {
        vec![
            Entry {
                id: "1767225600000".to_string(),
                vendor: "KXLY".to_string(),
                location: "Spokane".to_string(),
                month: "January".to_string(),
                year: "2026".to_string(),
                media_type: MediaType::Radio,
                amount: "100.50".to_string(),
            },
            Entry {
                id: "1767225600001".to_string(),
                vendor: "Google, Inc.".to_string(),
                location: "Coeur d'Alene".to_string(),
                month: "February".to_string(),
                year: "2026".to_string(),
                media_type: MediaType::Digital,
                amount: "75".to_string(),
            },
        ]
    }

    #[test]
    fn test_json_is_pretty_printed_array() {
        let json = to_json(&entries()).unwrap();
        assert!(json.starts_with("[\n  {\n    \"id\""));
        assert!(json.contains("\"mediaType\": \"Radio\""));
    }

    #[test]
    fn test_json_import_accepts_api_body() {
        let body = format!("{{\"entries\": {}}}", to_json(&entries()).unwrap());
        assert_eq!(from_json(&body).unwrap(), entries());
        assert!(from_json("{\"nope\": 1}").is_err());
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let mut out = Vec::new();
        write_csv(&mut out, &entries()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("id,vendor,location,month,year,mediaType,amount\n"));
        assert!(text.contains("\"Google, Inc.\""));
        assert_eq!(read_csv(text.as_bytes()).unwrap(), entries());
    }

    #[test]
    fn test_export_to_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join(EXPORT_FILE_NAME);
        let csv_path = dir.path().join("entries.csv");

        assert_eq!(ExportFormat::from_path(&json_path), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(&csv_path), ExportFormat::Csv);

        export_to_path(&json_path, ExportFormat::Json, &entries()).unwrap();
        export_to_path(&csv_path, ExportFormat::Csv, &entries()).unwrap();

        assert_eq!(import_from_path(&json_path).unwrap(), entries());
        assert_eq!(import_from_path(&csv_path).unwrap(), entries());
    }
}
