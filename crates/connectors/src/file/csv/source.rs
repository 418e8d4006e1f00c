use crate::file::csv::error::FileError;
use model::{
    core::value::{FieldValue, Value},
    records::{
        batch::{RecordBatch, TargetColumn},
        row::Row,
    },
};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Reads delimited text files into ordered, index-tagged rows.
#[derive(Debug, Clone, Copy)]
pub struct CsvRecordSource {
    delimiter: u8,
}

impl Default for CsvRecordSource {
    fn default() -> Self {
        CsvRecordSource { delimiter: b',' }
    }
}

impl CsvRecordSource {
    pub fn new(delimiter: char) -> Result<Self, FileError> {
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(|b| b.is_ascii() && *b != b'"' && *b != b'\n')
            .ok_or(FileError::InvalidDelimiter(delimiter))?;
        Ok(CsvRecordSource { delimiter })
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Data files directly under `dir`, sorted by file name.
    pub fn list_data_files(&self, dir: &Path) -> Result<Vec<PathBuf>, FileError> {
        let entries = fs::read_dir(dir).map_err(|e| FileError::io(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FileError::io(dir, e))?;
            let path = entry.path();
            let is_hidden = entry.file_name().to_string_lossy().starts_with('.');
            if path.is_file() && !is_hidden {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(dir = %dir.display(), files = files.len(), "Listed data files");
        Ok(files)
    }

    /// Reads at most `limit` rows (all rows when `None`) from `path`.
    pub fn read_batch(&self, path: &Path, limit: Option<usize>) -> Result<RecordBatch, FileError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_path(path)
            .map_err(|e| FileError::csv(path, e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| FileError::csv(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(FileError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("duplicate column '{dup}'"),
            });
        }

        let limit = limit.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        for (index, record) in reader.records().take(limit).enumerate() {
            let record = record.map_err(|e| FileError::csv(path, e))?;
            let fields = columns
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| FieldValue::new(name.clone(), Value::infer(cell)))
                .collect();
            rows.push(Row::new(index, fields));
        }

        debug!(file = %path.display(), rows = rows.len(), "Read record batch");
        Ok(RecordBatch::new(path, columns, rows))
    }
}

/// Splits a batch into its label column and predictor rows projected onto
/// `inputs`, both keyed by the original row index.
pub fn split_target_predictors(
    batch: &RecordBatch,
    target: &str,
    inputs: &[String],
) -> Result<(TargetColumn, Vec<Row>), FileError> {
    let missing = |column: &str| FileError::MissingColumn {
        path: batch.source.clone(),
        column: column.to_string(),
    };

    if !batch.has_column(target) {
        return Err(missing(target));
    }
    if let Some(column) = inputs.iter().find(|c| !batch.has_column(c)) {
        return Err(missing(column));
    }

    let target = TargetColumn {
        name: target.to_string(),
        values: batch
            .rows
            .iter()
            .map(|r| (r.index, r.get_value(target)))
            .collect(),
    };

    let predictors = batch
        .rows
        .iter()
        .map(|r| r.project(inputs).map_err(|c| missing(&c)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((target, predictors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::records::row::RowIndex;
    use std::io::Write;
    use tempfile::tempdir;

    const HMEQ: &str = "BAD,LOAN,MORTDUE,JOB\n\
                        1,1100,25860,Other\n\
                        0,1300,,Office\n\
                        1,1500,13500,nan\n\
                        0,1700,97800,Mgr\n";

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn lists_files_in_lexicographic_order() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "perf_2_q2.csv", HMEQ);
        write_file(dir.path(), "perf_10_q1.csv", HMEQ);
        write_file(dir.path(), "perf_1_q1.csv", HMEQ);
        write_file(dir.path(), ".hidden", HMEQ);
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = CsvRecordSource::default()
            .list_data_files(dir.path())
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, vec!["perf_10_q1.csv", "perf_1_q1.csv", "perf_2_q2.csv"]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let err = CsvRecordSource::default()
            .list_data_files(Path::new("/no/such/dir"))
            .unwrap_err();
        assert!(matches!(err, FileError::NotFound(_)));
    }

    #[test]
    fn reads_all_rows_with_typed_cells() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "perf.csv", HMEQ);

        let batch = CsvRecordSource::default().read_batch(&path, None).unwrap();

        assert_eq!(batch.columns, vec!["BAD", "LOAN", "MORTDUE", "JOB"]);
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.rows[1].index, RowIndex(1));
        assert_eq!(batch.rows[1].get_value("MORTDUE"), Value::Null);
        assert_eq!(batch.rows[2].get_value("JOB"), Value::Null);
        assert_eq!(batch.rows[3].get_value("LOAN"), Value::Int(1700));
    }

    #[test]
    fn limit_caps_the_row_count() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "perf.csv", HMEQ);
        let source = CsvRecordSource::default();

        assert_eq!(source.read_batch(&path, Some(2)).unwrap().len(), 2);
        assert_eq!(source.read_batch(&path, Some(100)).unwrap().len(), 4);
    }

    #[test]
    fn honours_custom_delimiter() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "perf.csv", "BAD;LOAN\n0;1000\n");

        let batch = CsvRecordSource::new(';')
            .unwrap()
            .read_batch(&path, None)
            .unwrap();
        assert_eq!(batch.rows[0].get_value("LOAN"), Value::Int(1000));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "bad.csv", "A,B\n1,2\n3\n");

        let err = CsvRecordSource::default()
            .read_batch(&path, None)
            .unwrap_err();
        assert!(matches!(err, FileError::Csv { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = CsvRecordSource::default()
            .read_batch(Path::new("/no/such/file.csv"), None)
            .unwrap_err();
        assert!(matches!(err, FileError::NotFound(_)));
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "dup.csv", "A,A\n1,2\n");

        let err = CsvRecordSource::default()
            .read_batch(&path, None)
            .unwrap_err();
        assert!(matches!(err, FileError::InvalidFormat { .. }));
    }

    #[test]
    fn splits_target_and_predictors_keeping_indices() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "perf.csv", HMEQ);
        let batch = CsvRecordSource::default().read_batch(&path, None).unwrap();
        let inputs = vec!["MORTDUE".to_string(), "LOAN".to_string()];

        let (target, predictors) = split_target_predictors(&batch, "BAD", &inputs).unwrap();

        assert_eq!(target.len(), 4);
        assert_eq!(target.get(RowIndex(2)), Some(&Value::Int(1)));
        assert_eq!(predictors.len(), 4);
        let columns: Vec<_> = predictors[0].columns().collect();
        assert_eq!(columns, vec!["MORTDUE", "LOAN"]);
        assert_eq!(predictors[3].index, RowIndex(3));
    }

    #[test]
    fn split_reports_missing_columns() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "perf.csv", HMEQ);
        let batch = CsvRecordSource::default().read_batch(&path, None).unwrap();

        let err = split_target_predictors(&batch, "TARGET", &[]).unwrap_err();
        assert!(matches!(err, FileError::MissingColumn { ref column, .. } if column == "TARGET"));

        let err = split_target_predictors(&batch, "BAD", &["VALUE".to_string()]).unwrap_err();
        assert!(matches!(err, FileError::MissingColumn { ref column, .. } if column == "VALUE"));
    }
}
