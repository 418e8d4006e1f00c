use crate::sql::{
    base::error::{ConnectorError, DbError},
    postgres::{
        config::PgEndpoint,
        data_type::PgColumnType,
        params::PgParamStore,
        utils::{connect_client, quote_ident, values_placeholders},
    },
};
use model::core::value::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, Row, types::Type};
use tracing::debug;

/// Upper bound on bind parameters in a single Postgres statement.
const MAX_BIND_PARAMS: usize = 65_535;

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<RwLock<Client>>,
}

impl PgAdapter {
    pub async fn connect(endpoint: &PgEndpoint) -> Result<Self, ConnectorError> {
        let client = connect_client(endpoint.to_config()).await?;
        debug!(host = %endpoint.host, dbname = %endpoint.dbname, "Connected to Postgres");
        Ok(PgAdapter {
            client: Arc::new(RwLock::new(client)),
        })
    }

    pub async fn exec(&self, query: &str) -> Result<(), DbError> {
        let client = self.client.read().await;
        client.batch_execute(query).await?;
        Ok(())
    }

    /// Drops `table` if present, recreates it from `columns` with types
    /// inferred from `rows`, and inserts every row. Runs as one transaction,
    /// so a failure leaves any previous table untouched.
    pub async fn replace_table(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> Result<u64, DbError> {
        if rows.iter().any(|r| r.len() != columns.len()) {
            return Err(DbError::Write(format!(
                "rows for table {table} do not match its {} columns",
                columns.len()
            )));
        }

        let types = PgColumnType::infer_columns(columns.len(), rows);
        let table_ident = quote_ident(table);
        let column_defs = columns
            .iter()
            .zip(&types)
            .map(|(c, t)| format!("{} {}", quote_ident(c), t))
            .collect::<Vec<_>>()
            .join(", ");
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut client = self.client.write().await;
        let tx = client.transaction().await?;
        tx.batch_execute(&format!(
            "DROP TABLE IF EXISTS {table_ident}; CREATE TABLE {table_ident} ({column_defs});"
        ))
        .await?;

        let mut written = 0;
        if !columns.is_empty() {
            let rows_per_statement = (MAX_BIND_PARAMS / columns.len()).max(1);
            for batch in rows.chunks(rows_per_statement) {
                let sql = format!(
                    "INSERT INTO {table_ident} ({column_list}) VALUES {}",
                    values_placeholders(batch.len(), columns.len())
                );
                let params = PgParamStore::from_rows(batch, &types);
                written += tx.execute(&sql, &params.as_refs()).await?;
            }
        }

        tx.commit().await?;
        debug!(table, rows = written, columns = columns.len(), "Table replaced");
        Ok(written)
    }

    /// Reads `columns` of `table` back as values.
    pub async fn fetch_rows(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<Vec<Value>>, DbError> {
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {column_list} FROM {}", quote_ident(table));
        let client = self.client.read().await;
        let rows = client.query(&sql, &[]).await?;
        rows.iter().map(row_values).collect()
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool, DbError> {
        let client = self.client.read().await;
        let row = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1)",
                &[&table],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    pub async fn drop_table(&self, table: &str) -> Result<(), DbError> {
        self.exec(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
            .await
    }
}

fn row_values(row: &Row) -> Result<Vec<Value>, DbError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = match *column.type_() {
                Type::INT8 => row.try_get::<_, Option<i64>>(i)?.map(Value::Int),
                Type::FLOAT8 => row.try_get::<_, Option<f64>>(i)?.map(Value::Float),
                Type::BOOL => row.try_get::<_, Option<bool>>(i)?.map(Value::Boolean),
                Type::TEXT | Type::VARCHAR => {
                    row.try_get::<_, Option<String>>(i)?.map(Value::String)
                }
                ref other => {
                    return Err(DbError::Unknown(format!(
                        "unsupported column type {other} for {}",
                        column.name()
                    )));
                }
            };
            Ok(value.unwrap_or(Value::Null))
        })
        .collect()
}
