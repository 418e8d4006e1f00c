use crate::file::csv::{error::FileError, source::CsvRecordSource};
use model::records::{
    audit::{AuditLog, AuditRecord},
    batch::file_label,
};
use std::{fs, path::Path};
use tracing::info;

/// Writes the accumulated audit log as one delimited file.
///
/// The file is written next to its final location and renamed into place, so
/// a reader never observes a half-written log.
pub fn write_audit_log(path: &Path, log: &AuditLog, delimiter: u8) -> Result<(), FileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FileError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(&tmp)
            .map_err(|e| FileError::csv(&tmp, e))?;

        if !log.columns.is_empty() {
            writer
                .write_record(&log.columns)
                .map_err(|e| FileError::csv(&tmp, e))?;
        }
        for record in &log.records {
            let cells = record
                .cells(&log.columns)
                .iter()
                .map(|v| v.to_cell())
                .collect::<Vec<_>>();
            writer
                .write_record(&cells)
                .map_err(|e| FileError::csv(&tmp, e))?;
        }
        writer.flush().map_err(|e| FileError::io(&tmp, e))?;
    }

    fs::rename(&tmp, path).map_err(|e| FileError::io(path, e))?;
    info!(path = %path.display(), records = log.len(), "Audit log written");
    Ok(())
}

/// Reads an audit log file back, up to `limit` records.
pub fn read_audit_log(
    source: &CsvRecordSource,
    path: &Path,
    limit: Option<usize>,
) -> Result<AuditLog, FileError> {
    let batch = source.read_batch(path, limit)?;
    let label = file_label(path);

    let mut log = AuditLog {
        columns: batch.columns,
        records: Vec::with_capacity(batch.rows.len()),
    };
    log.records.extend(batch.rows.into_iter().map(|row| AuditRecord {
        source: label.clone(),
        index: row.index,
        fields: row.fields,
    }));
    Ok(log)
}
