//! In-memory tab-separated output.

use std::io;

use super::ConvertError;

/// Accumulates one tab-separated table in memory
pub struct TsvTable {
    writer: csv::Writer<Vec<u8>>,
}

impl TsvTable {
    /// Start a table with its header line
    pub fn with_header(header: &[&str]) -> Result<Self, ConvertError> {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());
        let mut table = Self { writer };
        table.push(header)?;
        Ok(table)
    }

    /// Append one line
    pub fn push<I, T>(&mut self, record: I) -> Result<(), ConvertError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(record)?;
        Ok(())
    }

    /// Rendered table, every line newline-terminated
    pub fn finish(self) -> Result<String, ConvertError> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|e| ConvertError::IoError(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| ConvertError::IoError(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
