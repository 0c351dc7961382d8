use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::ResultRow;

/// Rows shown by the stdout preview.
pub const PREVIEW_ROWS: usize = 50;

/// Compact preview table of the first 50 rows.
pub fn print_preview(rows: &[ResultRow]) {
    println!("{:>4} | {:<60} | {:<40}", "#", "URL", "Keyword");
    println!("{}", "-".repeat(110));

    for (i, row) in rows.iter().take(PREVIEW_ROWS).enumerate() {
        println!(
            "{:>4} | {:<60} | {:<40}",
            i + 1,
            truncate(&row.url, 60),
            truncate(row.keyword.as_deref().unwrap_or(""), 40)
        );
    }

    if rows.len() > PREVIEW_ROWS {
        println!("... and {} more", rows.len() - PREVIEW_ROWS);
    }
    println!("\n{} items", rows.len());
}

pub fn write_csv(path: &Path, rows: &[ResultRow]) -> Result<()> {
    std::fs::write(path, format_csv(rows))
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn write_txt(path: &Path, rows: &[ResultRow]) -> Result<()> {
    std::fs::write(path, format_txt(rows))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Two-column CSV with a fixed header. Fields are quoted only when they
/// need it.
pub fn format_csv(rows: &[ResultRow]) -> String {
    let mut out = String::from("URL,Keyword\n");
    for row in rows {
        out.push_str(&csv_field(&row.url));
        out.push(',');
        out.push_str(&csv_field(row.keyword.as_deref().unwrap_or("")));
        out.push('\n');
    }
    out
}

/// One `{url} -> {keyword}` line per row; the keyword may be empty.
pub fn format_txt(rows: &[ResultRow]) -> String {
    rows.iter()
        .map(|row| format!("{} -> {}", row.url, row.keyword.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
