use model::records::{audit::AuditLog, chunk::LogChunk};
use std::num::NonZeroUsize;

pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

/// Splits an audit log into contiguous chunks of at most `chunk_size` records.
#[derive(Debug, Clone, Copy)]
pub struct LogChunker {
    chunk_size: NonZeroUsize,
}

impl Default for LogChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl LogChunker {
    pub fn new(chunk_size: NonZeroUsize) -> Self {
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Every chunk carries the full column set of the log so that chunk
    /// tables share one layout. An empty log yields no chunks.
    pub fn chunk(&self, log: &AuditLog) -> Vec<LogChunk> {
        log.records
            .chunks(self.chunk_size.get())
            .enumerate()
            .map(|(i, records)| LogChunk {
                sequence: i + 1,
                columns: log.columns.clone(),
                records: records.to_vec(),
            })
            .collect()
    }
}

/// Names chunk tables `{prefix}_{seq}_{label}{seq}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNamer {
    prefix: String,
    label: String,
}

impl TableNamer {
    pub fn new(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            label: label.into(),
        }
    }

    pub fn name(&self, sequence: usize) -> String {
        format!("{}_{sequence}_{}{sequence}", self.prefix, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        core::value::FieldValue,
        records::{audit::AuditRecord, row::RowIndex},
    };

    fn log(n: usize) -> AuditLog {
        let mut log = AuditLog::new();
        log.extend((0..n).map(|i| AuditRecord {
            source: "perf.csv".into(),
            index: RowIndex(i),
            fields: vec![FieldValue::new("LOAN", i as i64)],
        }));
        log
    }

    #[test]
    fn chunk_count_is_ceiling_of_len_over_size() {
        let chunker = LogChunker::new(NonZeroUsize::new(1000).unwrap());
        assert_eq!(chunker.chunk(&log(2500)).len(), 3);
        assert_eq!(chunker.chunk(&log(1000)).len(), 1);
        assert_eq!(chunker.chunk(&log(1)).len(), 1);
        assert!(chunker.chunk(&log(0)).is_empty());
    }

    #[test]
    fn chunks_are_contiguous_and_cover_the_log() {
        let source = log(7);
        let chunks = LogChunker::new(NonZeroUsize::new(3).unwrap()).chunk(&source);

        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        let sequences: Vec<usize> = chunks.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);

        let rejoined: Vec<AuditRecord> = chunks.into_iter().flat_map(|c| c.records).collect();
        assert_eq!(rejoined, source.records);
    }

    #[test]
    fn default_size_is_one_thousand() {
        assert_eq!(LogChunker::default().chunk_size().get(), 1000);
    }

    #[test]
    fn table_names_repeat_the_sequence() {
        let namer = TableNamer::new("perf", "2021Q");
        assert_eq!(namer.name(1), "perf_1_2021Q1");
        assert_eq!(namer.name(12), "perf_12_2021Q12");
    }
}
