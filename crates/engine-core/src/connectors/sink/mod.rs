use crate::error::SinkError;
use async_trait::async_trait;
use model::records::chunk::LogChunk;

pub mod memory;
pub mod postgres;

/// Destination of offloaded audit-log chunks.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Writes `chunk` as table `name`, replacing any table of that name.
    /// Returns the number of rows written.
    async fn replace_table(&self, name: &str, chunk: &LogChunk) -> Result<u64, SinkError>;
}
