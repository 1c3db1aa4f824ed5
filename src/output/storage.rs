use crate::scoring::FinalResult;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Current layout version of saved reports.
pub const REPORT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct SavedReport<'a> {
    version: u32,
    label: &'a str,
    result: &'a FinalResult,
}

/// Render a result as pretty JSON (same layout as a saved report)
pub fn format_json(label: &str, result: &FinalResult) -> Result<String> {
    let report = SavedReport {
        version: REPORT_VERSION,
        label,
        result,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

/// Render ranked results as a pretty JSON array of reports
pub fn format_json_list(results: &[(String, FinalResult)]) -> Result<String> {
    let reports: Vec<SavedReport> = results
        .iter()
        .map(|(label, result)| SavedReport {
            version: REPORT_VERSION,
            label,
            result,
        })
        .collect();
    serde_json::to_string_pretty(&reports).context("Failed to serialize reports")
}

/// Save a report to a JSON file atomically
///
/// Uses atomic-write-file so a reader never sees a half-written report.
/// Creates the parent directory if it doesn't exist.
pub fn save_report(path: &Path, label: &str, result: &FinalResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    let report = SavedReport {
        version: REPORT_VERSION,
        label,
        result,
    };
    serde_json::to_writer_pretty(&mut file, &report).context("Failed to serialize report")?;

    file.commit()
        .with_context(|| format!("Failed to save report to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceCatalog;
    use crate::observations::RawObservation;
    use crate::scoring::{score_supply, ScoringOptions};
    use chrono::{TimeZone, Utc};
    use std::env;

    fn result() -> FinalResult {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let obs = vec![RawObservation {
            parameter_code: "1340".to_string(),
            numeric_value: Some(0.0),
            text_value: None,
            sample_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            quality_limit: None,
            compliance_flag: None,
        }];
        score_supply(&catalog, &obs, now, None, &ScoringOptions::default())
    }

    #[test]
    fn test_save_report_writes_json() {
        let temp_path = env::temp_dir().join("water_score_test_report.json");
        let _ = fs::remove_file(&temp_path);

        save_report(&temp_path, "Clean town", &result()).unwrap();

        let content = fs::read_to_string(&temp_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["label"], "Clean town");
        assert_eq!(value["result"]["score"], 57);
        assert_eq!(value["result"]["tier"], "CORRECT");
        assert_eq!(value["result"]["categories"].as_array().unwrap().len(), 10);

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_save_report_creates_parent_dir() {
        let dir = env::temp_dir().join("water_score_test_reports");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("report.json");

        save_report(&path, "x", &result()).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_report_overwrites() {
        let temp_path = env::temp_dir().join("water_score_test_overwrite.json");
        fs::write(&temp_path, "stale").unwrap();

        save_report(&temp_path, "fresh", &result()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&temp_path).unwrap()).unwrap();
        assert_eq!(value["label"], "fresh");

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_format_json_matches_saved_layout() {
        let json = format_json("Clean town", &result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["metadata"]["tested_parameters"], 1);
        assert_eq!(value["result"]["provenance"], serde_json::Value::Null);
    }

    #[test]
    fn test_format_json_list() {
        let results = vec![
            ("a".to_string(), result()),
            ("b".to_string(), result()),
        ];
        let value: serde_json::Value =
            serde_json::from_str(&format_json_list(&results).unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["label"], "b");
        assert_eq!(format_json_list(&[]).unwrap(), "[]");
    }
}
