use crate::errors::AppResult;
use crate::export::model::{BatchRow, HEADERS};
use csv::Writer;
use std::path::Path;

/// Write the batch rows as CSV into `path`.
pub(crate) fn write_csv(rows: &[BatchRow], path: &Path) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record(HEADERS)?;

    for row in rows {
        wtr.write_record(row.cells())?;
    }

    wtr.flush()?;
    Ok(())
}
