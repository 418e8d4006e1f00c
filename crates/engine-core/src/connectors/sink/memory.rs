use crate::{connectors::sink::LogSink, error::SinkError};
use async_trait::async_trait;
use model::{core::value::Value, records::chunk::LogChunk};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// How an injected write failure presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFault {
    /// Surfaces as a dropped connection, which the offload retries.
    Transient,
    /// Surfaces as a write rejection, which stops the offload.
    Permanent,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, StoredTable>,
    writes: usize,
    faults: HashMap<usize, SinkFault>,
}

/// Keeps tables in memory. Backs `--dry-run` and lets tests fail chosen
/// write attempts.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `attempt`-th call to `replace_table` (1-based, counting
    /// every call including failed ones).
    pub async fn fail_attempt(&self, attempt: usize, fault: SinkFault) {
        self.state.lock().await.faults.insert(attempt, fault);
    }

    pub async fn attempts(&self) -> usize {
        self.state.lock().await.writes
    }

    pub async fn table(&self, name: &str) -> Option<StoredTable> {
        self.state.lock().await.tables.get(name).cloned()
    }

    pub async fn table_names(&self) -> Vec<String> {
        self.state.lock().await.tables.keys().cloned().collect()
    }

    pub async fn tables(&self) -> BTreeMap<String, StoredTable> {
        self.state.lock().await.tables.clone()
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn replace_table(&self, name: &str, chunk: &LogChunk) -> Result<u64, SinkError> {
        let mut state = self.state.lock().await;
        state.writes += 1;
        let attempt = state.writes;
        match state.faults.remove(&attempt) {
            Some(SinkFault::Transient) => return Err(SinkError::Closed),
            Some(SinkFault::Permanent) => {
                return Err(SinkError::Other(format!("write of {name} rejected")));
            }
            None => {}
        }

        let table = StoredTable {
            columns: chunk.columns.clone(),
            rows: chunk.cells(),
        };
        let written = table.rows.len() as u64;
        state.tables.insert(name.to_string(), table);
        Ok(written)
    }
}
