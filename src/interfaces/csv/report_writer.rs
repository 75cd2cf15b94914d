use std::io::Write;

use crate::domain::machine::MachineReport;
use crate::error::Result;

/// Writes the final inventory snapshot as CSV
/// (`id,name,unit_price,stock,heated`, one row per slot).
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_report(&mut self, report: &MachineReport) -> Result<()> {
        for product in &report.products {
            self.writer.serialize(product)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
