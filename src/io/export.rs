//! JSON and CSV export for settlement reports.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::settlement::SettlementReport;

/// Column header for the per-site CSV export.
const HEADER: &str = "nmi,direct_fees,shared_fees";

/// Exports the full report as pretty-printed JSON at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_json(report: &SettlementReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_json(report, buf)
}

/// Writes the full report as pretty-printed JSON to any writer, with a
/// trailing newline. Produces deterministic bytes for identical reports.
pub fn write_json(report: &SettlementReport, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)
}

/// Exports the per-site rows as CSV at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(report: &SettlementReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(report, buf)
}

/// Writes the per-site rows as CSV to any writer: a header row followed by
/// one `nmi,direct_fees,shared_fees` row per site, in report order.
pub fn write_csv(report: &SettlementReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for site in &report.sites {
        wtr.write_record(&[
            site.nmi.as_str(),
            site.direct_fees.as_str(),
            site.shared_fees.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
