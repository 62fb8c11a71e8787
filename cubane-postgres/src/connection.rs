//! PostgreSQL connection wrapper.

use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, info};

use crate::config::PgConfig;
use crate::error::PgResult;

/// A wrapper around a single PostgreSQL connection.
///
/// The migrator deliberately holds exactly one connection: every mutation
/// of a run must happen inside the one transaction this connection owns.
pub struct PgConnection {
    client: Client,
}

impl PgConnection {
    /// Open a connection from a parsed configuration.
    pub async fn open(config: &PgConfig) -> PgResult<Self> {
        let (client, connection) = config.to_pg_config().connect(NoTls).await?;

        // The connection object drives the socket; run it until the client
        // is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(error = %e, "connection task ended");
            }
        });

        info!(
            host = %config.host,
            port = %config.port,
            database = %config.database,
            "PostgreSQL connection established"
        );

        Ok(Self { client })
    }

    /// Execute a query and return all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> PgResult<Vec<Row>> {
        debug!(sql = %sql, "Executing query");
        let rows = self.client.query(sql, params).await?;
        Ok(rows)
    }

    /// Execute a query and return exactly one row.
    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> PgResult<Row> {
        debug!(sql = %sql, "Executing query_one");
        let row = self.client.query_one(sql, params).await?;
        Ok(row)
    }

    /// Execute a query and return zero or one row.
    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> PgResult<Option<Row>> {
        debug!(sql = %sql, "Executing query_opt");
        let row = self.client.query_opt(sql, params).await?;
        Ok(row)
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> PgResult<u64> {
        debug!(sql = %sql, "Executing statement");
        let count = self.client.execute(sql, params).await?;
        Ok(count)
    }

    /// Execute one or more statements without preparing them.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        debug!(sql = %sql, "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}
