//! Per-tick telemetry records and the sinks that consume them.

use arrayvec::ArrayString;
use core::fmt::Write as _;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

pub const CSV_HEADER: &str = "time, battery, outer temp., angular Velocity, c torque";
pub const FIELD_COUNT: usize = 5;

const ROW_CAPACITY: usize = 256;
const HISTORY_CAPACITY: usize = 512;

type RowBuffer = ArrayString<ROW_CAPACITY>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("telemetry row exceeds {capacity} bytes")]
    RowOverflow { capacity: usize },
}

/// One named numeric value in a telemetry row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryField {
    pub name: &'static str,
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub time_s: f32,
    pub battery_voltage: f32,
    pub temperature: f32,
    pub angular_velocity: f32,
    pub control_torque: f32,
}

impl TelemetryRecord {
    /// Fields in log column order.
    #[must_use]
    pub fn fields(&self) -> [TelemetryField; FIELD_COUNT] {
        [
            TelemetryField { name: "time", value: self.time_s },
            TelemetryField { name: "battery", value: self.battery_voltage },
            TelemetryField { name: "outer_temp", value: self.temperature },
            TelemetryField { name: "angular_velocity", value: self.angular_velocity },
            TelemetryField { name: "control_torque", value: self.control_torque },
        ]
    }
}

pub trait TelemetrySink {
    /// Consume one record.
    ///
    /// # Errors
    ///
    /// Returns a [`TelemetryError`] when the record cannot be stored.
    fn record_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError>;

    /// Push buffered records to their destination.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Io`] when the underlying writer fails.
    fn flush(&mut self) -> Result<(), TelemetryError> {
        Ok(())
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for Box<S> {
    fn record_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        (**self).record_telemetry(record)
    }

    fn flush(&mut self) -> Result<(), TelemetryError> {
        (**self).flush()
    }
}

/// Shared handle so a caller can keep reading a sink it handed to a mission.
impl<S: TelemetrySink> TelemetrySink for Rc<RefCell<S>> {
    fn record_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        self.borrow_mut().record_telemetry(record)
    }

    fn flush(&mut self) -> Result<(), TelemetryError> {
        self.borrow_mut().flush()
    }
}

/// Comma-separated log: header on first write, then one row per record with
/// every value to two decimals followed by a comma, rows ended by `\r\n`.
#[derive(Debug)]
pub struct CsvTelemetryLog<W: Write> {
    writer: W,
    header_written: bool,
    rows_written: u32,
}

impl CsvTelemetryLog<BufWriter<File>> {
    /// Create (or truncate) a log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Io`] when the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CsvTelemetryLog<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            rows_written: 0,
        }
    }

    #[must_use]
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for CsvTelemetryLog<W> {
    fn record_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        if !self.header_written {
            write!(self.writer, "{CSV_HEADER}\r\n")?;
            self.header_written = true;
        }

        let row = format_csv_row(record)?;
        self.writer.write_all(row.as_bytes())?;
        self.rows_written = self.rows_written.wrapping_add(1);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TelemetryError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn format_csv_row(record: &TelemetryRecord) -> Result<RowBuffer, TelemetryError> {
    let mut row = RowBuffer::new();
    let overflow = |_: core::fmt::Error| TelemetryError::RowOverflow { capacity: ROW_CAPACITY };

    for field in record.fields() {
        write!(row, "{:.2},", field.value).map_err(overflow)?;
    }
    row.write_str("\r\n").map_err(overflow)?;
    Ok(row)
}

/// Bounded in-memory sink keeping the most recent records.
#[derive(Debug, Default)]
pub struct TelemetryHistory {
    records: heapless::Vec<TelemetryRecord, HISTORY_CAPACITY>,
    total_received: u32,
}

impl TelemetryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn total_received(&self) -> u32 {
        self.total_received
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }
}

impl TelemetrySink for TelemetryHistory {
    fn record_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        if self.records.is_full() {
            self.records.remove(0);
        }
        // Room was made above
        let _ = self.records.push(*record);
        self.total_received = self.total_received.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_format() {
        let record = TelemetryRecord {
            time_s: 5.126,
            battery_voltage: 4.195,
            temperature: 29.64,
            angular_velocity: 3.008,
            control_torque: -0.3008,
        };
        let row = format_csv_row(&record).unwrap();
        assert_eq!(row.as_str(), "5.13,4.20,29.64,3.01,-0.30,\r\n");
    }
}
