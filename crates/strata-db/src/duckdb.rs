//! DuckDB connection backend

use crate::error::{DbError, DbResult};
use crate::traits::Connection;
use async_trait::async_trait;
use duckdb::Connection as DuckConnection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use strata_core::sql_utils::quote_ident;

/// DuckDB backend, one process-wide connection behind a mutex
pub struct DuckDbBackend {
    conn: Mutex<DuckConnection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn = DuckConnection::open_in_memory()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn =
            DuckConnection::open(path).map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, DuckConnection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::Execution(format!("{}: {}", e, sql)))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)?;
        Ok(count as usize)
    }

    fn query_max_sync(&self, table: &str, column: &str) -> DbResult<Option<String>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT CAST(MAX({}) AS VARCHAR) FROM {}",
            quote_ident(column),
            table
        );
        let max: Option<String> = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(DbError::from)?;
        Ok(max)
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        Ok(self.relation_kind_sync(name)?.is_some())
    }

    /// Catalog type of the relation: `VIEW`, `BASE TABLE`, or None
    fn relation_kind_sync(&self, name: &str) -> DbResult<Option<String>> {
        let conn = self.lock()?;
        let (schema, table) = split_relation(name);

        let sql = format!(
            "SELECT table_type FROM information_schema.tables WHERE table_schema = '{}' AND table_name = '{}'",
            schema, table
        );

        match conn.query_row(&sql, [], |row| row.get(0)) {
            Ok(kind) => Ok(Some(kind)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }

    fn merge_upsert_sync(&self, table: &str, select: &str, unique_key: &str) -> DbResult<()> {
        // Delete-then-insert inside one transaction. CTAS tables carry no
        // primary key, so ON CONFLICT is not available here.
        let key = quote_ident(unique_key);
        let conn = self.lock()?;

        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(DbError::from)?;
        let steps = conn
            .execute_batch(&format!(
                "DELETE FROM {table} WHERE {key} IN (SELECT {key} FROM ({select}))"
            ))
            .and_then(|_| {
                conn.execute_batch(&format!("INSERT INTO {table} SELECT * FROM ({select})"))
            })
            .and_then(|_| conn.execute_batch("COMMIT"));

        if let Err(e) = steps {
            // The delete must not survive a failed insert
            let _ = conn.execute_batch("ROLLBACK");
            return Err(DbError::from(e));
        }
        Ok(())
    }
}

/// Split a possibly schema-qualified, possibly quoted relation name
fn split_relation(name: &str) -> (&str, &str) {
    let (schema, table) = match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    };
    (schema.trim_matches('"'), table.trim_matches('"'))
}

#[async_trait]
impl Connection for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn create_view_as(&self, name: &str, select: &str) -> DbResult<()> {
        // OR REPLACE cannot swap a view in over a table of the same name
        if self
            .relation_kind_sync(name)?
            .is_some_and(|kind| kind != "VIEW")
        {
            self.drop_if_exists(name).await?;
        }
        self.execute_sync(&format!("CREATE OR REPLACE VIEW {} AS {}", name, select))?;
        Ok(())
    }

    async fn create_table_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()> {
        if replace && self.relation_kind_sync(name)?.as_deref() == Some("VIEW") {
            self.drop_if_exists(name).await?;
        }
        let sql = if replace {
            format!("CREATE OR REPLACE TABLE {} AS {}", name, select)
        } else {
            format!("CREATE TABLE {} AS {}", name, select)
        };
        self.execute_sync(&sql)?;
        Ok(())
    }

    async fn merge_upsert(&self, table: &str, select: &str, unique_key: &str) -> DbResult<()> {
        self.merge_upsert_sync(table, select, unique_key)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn query_max(&self, table: &str, column: &str) -> DbResult<Option<String>> {
        self.query_max_sync(table, column)
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        // A name can exist as either kind; try both
        let _ = self.execute_sync(&format!("DROP VIEW IF EXISTS {}", name));
        let _ = self.execute_sync(&format!("DROP TABLE IF EXISTS {}", name));
        Ok(())
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.execute_sync(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "duckdb"
    }
}
