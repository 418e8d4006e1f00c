use crate::{connectors::sink::LogSink, error::SinkError};
use async_trait::async_trait;
use connectors::sql::postgres::{adapter::PgAdapter, config::PgEndpoint};
use model::records::chunk::LogChunk;

pub struct PostgresSink {
    adapter: PgAdapter,
}

impl PostgresSink {
    pub fn new(adapter: PgAdapter) -> Self {
        Self { adapter }
    }

    pub async fn connect(endpoint: &PgEndpoint) -> Result<Self, SinkError> {
        Ok(Self::new(PgAdapter::connect(endpoint).await?))
    }
}

#[async_trait]
impl LogSink for PostgresSink {
    async fn replace_table(&self, name: &str, chunk: &LogChunk) -> Result<u64, SinkError> {
        let rows = chunk.cells();
        let written = self
            .adapter
            .replace_table(name, &chunk.columns, &rows)
            .await?;
        Ok(written)
    }
}
