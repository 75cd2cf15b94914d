use std::io::Read;

use crate::application::session::Op;
use crate::error::{Result, VendError};

/// Reads session operations from a CSV source.
///
/// Wraps `csv::Reader` and yields an iterator of `Result<Op>`, trimming
/// whitespace and tolerating short records so a hand-written script
/// doesn't need trailing commas.
pub struct OpReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OpReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes operations, streaming large scripts
    /// without loading them fully into memory.
    pub fn ops(self) -> impl Iterator<Item = Result<Op>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(VendError::from))
    }
}
