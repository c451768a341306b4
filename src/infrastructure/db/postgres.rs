//! Relational store for merged rows
//!
//! Owns a single PostgreSQL connection (no pooling) and the table the merged
//! rows are loaded into. A `RelationalStore` only exists once the connection
//! is open and the table is ensured, so there is no half-initialized state.
//!
//! Release: `release` closes the connection gracefully on both success and
//! failure paths; dropping the store closes the socket as well.

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{error, info, warn};

use crate::domain::dataset::{leading_pair, PivotGroup, Row, TableRow};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::DatabaseConfig;

/// PostgreSQL identifiers longer than this are truncated by the server
const MAX_IDENTIFIER_LEN: usize = 63;

pub struct RelationalStore {
    conn: PgConnection,
    table: String,
}

impl RelationalStore {
    /// Open a connection and ensure the target table exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        validate_table_name(&config.table)?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let mut conn = PgConnection::connect_with(&options).await.map_err(|e| {
            error!(
                host = %config.host,
                database = %config.database,
                error = %e,
                "Failed to connect to PostgreSQL"
            );
            AppError::DatabaseError(format!("Failed to connect to PostgreSQL: {}", e))
        })?;

        sqlx::query(&create_table_sql(&config.table))
            .execute(&mut conn)
            .await
            .map_err(|e| {
                error!(table = %config.table, error = %e, "Failed to create table");
                AppError::DatabaseError(format!(
                    "Failed to create table {}: {}",
                    config.table, e
                ))
            })?;

        info!(
            host = %config.host,
            database = %config.database,
            table = %config.table,
            "Connected to PostgreSQL"
        );

        Ok(Self {
            conn,
            table: config.table.clone(),
        })
    }

    /// Insert the first two fields of every row, one statement per row.
    /// Returns the number of inserted rows.
    pub async fn insert_data(&mut self, rows: &[Row]) -> Result<u64> {
        let sql = insert_sql(&self.table);
        let mut inserted = 0u64;

        for (index, row) in rows.iter().enumerate() {
            let (column1, column2) = leading_pair(index, row)?;

            let result = sqlx::query(&sql)
                .bind(column1)
                .bind(column2)
                .execute(&mut self.conn)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to insert row {}: {}", index, e))
                })?;
            inserted += result.rows_affected();
        }

        info!(table = %self.table, rows = inserted, "Inserted rows");
        Ok(inserted)
    }

    /// Group all rows by `column2`, collecting sorted `column1` values per group
    pub async fn pivot_table_query(&mut self) -> Result<Vec<PivotGroup>> {
        sqlx::query_as::<_, PivotGroup>(&pivot_sql(&self.table))
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Pivot query failed: {}", e)))
    }

    /// Every persisted row in insertion order
    pub async fn fetch_all(&mut self) -> Result<Vec<TableRow>> {
        let sql = format!(
            "SELECT id, column1, column2 FROM {} ORDER BY id",
            self.table
        );
        sqlx::query_as::<_, TableRow>(&sql)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch rows: {}", e)))
    }

    /// Close the connection, then hand back `outcome`.
    /// A close failure only surfaces when `outcome` succeeded.
    pub async fn release<T>(self, outcome: Result<T>) -> Result<T> {
        let table = self.table;
        let closed = self.conn.close().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => {
                info!(table = %table, "Closed PostgreSQL connection");
                Ok(value)
            }
            (Ok(_), Err(e)) => Err(AppError::DatabaseError(format!(
                "Failed to close connection: {}",
                e
            ))),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(e)) => {
                warn!(error = %e, "Failed to close connection after error");
                Err(err)
            }
        }
    }
}

/// Accept plain identifiers only, since the table name is spliced into SQL
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid table name '{}': expected [A-Za-z_][A-Za-z0-9_]* up to {} bytes",
            name, MAX_IDENTIFIER_LEN
        )))
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id SERIAL PRIMARY KEY,
            column1 TEXT,
            column2 TEXT
        )",
        table
    )
}

fn insert_sql(table: &str) -> String {
    format!("INSERT INTO {} (column1, column2) VALUES ($1, $2)", table)
}

fn pivot_sql(table: &str) -> String {
    format!(
        "SELECT column2, ARRAY_AGG(column1 ORDER BY column1) AS items FROM {}
         GROUP BY column2 ORDER BY column2",
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("combined_data").is_ok());
        assert!(validate_table_name("_rows2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2rows").is_err());
        assert!(validate_table_name("rows; DROP TABLE x").is_err());
        assert!(validate_table_name("таблица").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_create_table_is_idempotent_ddl() {
        let sql = create_table_sql("combined_data");
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS combined_data"));
        assert!(sql.contains("id SERIAL PRIMARY KEY"));
        assert!(sql.contains("column1 TEXT"));
        assert!(sql.contains("column2 TEXT"));
    }

    #[test]
    fn test_insert_is_parameterized() {
        assert_eq!(
            insert_sql("combined_data"),
            "INSERT INTO combined_data (column1, column2) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_pivot_groups_by_second_column() {
        let sql = pivot_sql("combined_data");
        assert!(sql.contains("ARRAY_AGG(column1 ORDER BY column1) AS items"));
        assert!(sql.contains("GROUP BY column2 ORDER BY column2"));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_table_before_dialing() {
        let config = DatabaseConfig {
            table: "bad name".to_string(),
            ..DatabaseConfig::default()
        };
        let result = RelationalStore::connect(&config).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_connect_failure_is_propagated() {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DatabaseConfig::default()
        };
        let result = RelationalStore::connect(&config).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }
}
