// src/output.rs
// =============================================================================
// Writes crawl results as CSV.
//
// Format:
//   URL
//   https://example.com/
//   https://example.com/about
//
// A header row, then one single-column row per crawled URL, '\n'-terminated
// and UTF-8. The csv crate takes care of quoting URLs that contain commas
// or quotes.
// =============================================================================

use anyhow::{Context, Result};
use std::path::Path;

pub fn write_csv(path: &Path, urls: &[String]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;

    writer.write_record(["URL"])?;
    for url in urls {
        writer.write_record([url])?;
    }
    writer.flush()?;

    Ok(())
}
