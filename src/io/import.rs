//! CSV ingestion for tagged entity rows and metering events.
//!
//! Ingestion is a thin provider of parsed rows: fields are parsed exactly
//! as written (decimal text, never through binary floats) and semantic
//! checks stay with the registry and engine.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::registry::{Battery, Registry, Site, ValidationError, Vpp};
use crate::settlement::MeterEvent;

/// Expected column header for event files.
const EVENT_HEADER: &str = "nmi,date,energy,tariff";

/// Failure while reading entity or event rows.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {line}: {message}")]
    Row { line: u64, message: String },
    #[error("row {line}: {source}")]
    Validation { line: u64, source: ValidationError },
}

/// Reads tagged entity rows into the registry from a file.
///
/// See [`read_entities`] for the row format.
pub fn import_entities(path: &Path, registry: &mut Registry) -> Result<usize, ImportError> {
    let file = File::open(path)?;
    read_entities(io::BufReader::new(file), registry)
}

/// Reads tagged entity rows into the registry from any reader.
///
/// Rows are headerless, dispatched on the first column:
///
/// ```text
/// vpp,<name>,<revenue_percentage>,<daily_fee>
/// site,<vpp_name>,<nmi>,<address>
/// battery,<nmi>,<manufacturer>,<serial_num>,<capacity>
/// ```
///
/// Returns the number of entities admitted. An unknown tag, a missing or
/// unparseable field, or a failed registration aborts the read with the row
/// number; rows admitted before the failure stay registered.
pub fn read_entities(reader: impl Read, registry: &mut Registry) -> Result<usize, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut admitted = 0;
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        match field(&record, 0, "type", line)? {
            "vpp" => {
                let name = field(&record, 1, "name", line)?;
                let revenue_percentage = decimal_field(&record, 2, "revenue_percentage", line)?;
                let daily_fee = decimal_field(&record, 3, "daily_fee", line)?;
                registry
                    .register_vpp(Vpp::new(name, revenue_percentage, daily_fee))
                    .map_err(|source| ImportError::Validation { line, source })?;
            }
            "site" => {
                let vpp_name = field(&record, 1, "vpp_name", line)?;
                let nmi = field(&record, 2, "nmi", line)?;
                let address = field(&record, 3, "address", line)?;
                registry
                    .register_site(Site::new(vpp_name, nmi, address))
                    .map_err(|source| ImportError::Validation { line, source })?;
            }
            "battery" => {
                let nmi = field(&record, 1, "nmi", line)?;
                let manufacturer = field(&record, 2, "manufacturer", line)?;
                let serial_num = field(&record, 3, "serial_num", line)?;
                let capacity = decimal_field(&record, 4, "capacity", line)?;
                registry
                    .register_battery(Battery::new(nmi, manufacturer, serial_num, capacity))
                    .map_err(|source| ImportError::Validation { line, source })?;
            }
            other => {
                return Err(ImportError::Row {
                    line,
                    message: format!("unknown entity type \"{other}\""),
                });
            }
        }
        admitted += 1;
    }
    Ok(admitted)
}

/// Reads metering events from a file. See [`read_events`] for the format.
pub fn import_events(path: &Path) -> Result<Vec<MeterEvent>, ImportError> {
    let file = File::open(path)?;
    read_events(io::BufReader::new(file))
}

/// Reads metering events from any reader.
///
/// Expects a `nmi,date,energy,tariff` header row followed by data rows in
/// that column order. A header that does not match aborts the read, so a
/// headerless file fails instead of losing its first row. No semantic
/// checks happen here; an unresolvable `nmi` only surfaces when the events
/// are bound.
pub fn read_events(reader: impl Read) -> Result<Vec<MeterEvent>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?;
    if headers != EVENT_HEADER.split(',').collect::<Vec<_>>() {
        return Err(ImportError::Row {
            line: 1,
            message: format!(
                "expected header \"{EVENT_HEADER}\", got \"{}\"",
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }

    let mut events = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let nmi = field(&record, 0, "nmi", line)?;
        let date = field(&record, 1, "date", line)?;
        let energy = decimal_field(&record, 2, "energy", line)?;
        let tariff = decimal_field(&record, 3, "tariff", line)?;
        events.push(MeterEvent::new(nmi, date, energy, tariff));
    }
    Ok(events)
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, ImportError> {
    record.get(idx).ok_or_else(|| ImportError::Row {
        line,
        message: format!("missing {name} column"),
    })
}

fn decimal_field(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<Decimal, ImportError> {
    let raw = field(record, idx, name, line)?;
    raw.parse::<Decimal>().map_err(|e| ImportError::Row {
        line,
        message: format!("{name} \"{raw}\": {e}"),
    })
}
