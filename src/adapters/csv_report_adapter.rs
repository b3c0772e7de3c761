//! CSV report writer.

use crate::domain::error::ScoutError;
use crate::ports::report_port::{ReportPort, Table};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    Stdout,
    /// `<dir>/<table name>.csv`
    Directory(PathBuf),
    File(PathBuf),
}

pub struct CsvReportAdapter {
    destination: Destination,
}

impl CsvReportAdapter {
    pub fn stdout() -> Self {
        Self {
            destination: Destination::Stdout,
        }
    }

    pub fn to_dir(dir: PathBuf) -> Self {
        Self {
            destination: Destination::Directory(dir),
        }
    }

    pub fn to_file(path: PathBuf) -> Self {
        Self {
            destination: Destination::File(path),
        }
    }

    /// `-` means stdout, any other value a file; without one, tables land
    /// in `output_dir`.
    pub fn from_output(output: Option<&str>, output_dir: PathBuf) -> Self {
        match output {
            Some("-") => Self::stdout(),
            Some(path) => Self::to_file(PathBuf::from(path)),
            None => Self::to_dir(output_dir),
        }
    }

    fn write_to<W: Write>(writer: W, table: &Table) -> Result<(), ScoutError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&table.headers).map_err(csv_error)?;
        for row in &table.rows {
            wtr.write_record(row).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> ScoutError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => ScoutError::Io(io),
        other => ScoutError::Io(io::Error::other(format!("{other:?}"))),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_table(&self, table: &Table) -> Result<(), ScoutError> {
        let path = match &self.destination {
            Destination::Stdout => return Self::write_to(io::stdout().lock(), table),
            Destination::Directory(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.join(format!("{}.csv", table.name))
            }
            Destination::File(path) => path.clone(),
        };

        Self::write_to(std::fs::File::create(&path)?, table)?;
        info!(
            table = %table.name,
            rows = table.len(),
            path = %path.display(),
            "wrote report"
        );
        Ok(())
    }
}
