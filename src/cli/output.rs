//! Output formatting for CLI reports

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::TrainingResult;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, &str)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

pub fn print_training_result(result: &TrainingResult) {
    print_stats_table(&[
        ("Episodes", &format_number(result.episodes)),
        ("Total steps", &format_number(result.total_steps)),
        ("Terminated", &format_number(result.terminated)),
        ("Truncated", &format_number(result.truncated)),
        ("Mean length", &format!("{:.2}", result.mean_episode_length)),
        ("Mean return", &format!("{:.2}", result.mean_return)),
    ]);
}

/// Normalize a user-supplied summary path.
///
/// Trailing separators select `training_summary.json` inside that directory;
/// any other extension is replaced by `.json`.
pub fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

/// Write `value` as pretty JSON to the sanitized `raw` path.
pub fn write_summary<T: Serialize>(raw: &Path, value: &T) -> Result<PathBuf> {
    let path = sanitize_summary_path(raw);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write summary JSON")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(8000), "8,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_sanitize_summary_path() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/run")),
            PathBuf::from("out/run.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/run.JSON")),
            PathBuf::from("out/run.JSON")
        );
        let dir = format!("out{}", std::path::MAIN_SEPARATOR);
        assert_eq!(
            sanitize_summary_path(Path::new(&dir)),
            PathBuf::from("out").join("training_summary.json")
        );
    }
}
