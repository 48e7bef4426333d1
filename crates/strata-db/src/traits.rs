//! Connection trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Target-store abstraction the executor builds against
///
/// Implementations must be Send + Sync so the executor can share one
/// connection across concurrent model tasks.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements as one batch
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Create or replace a view defined by a SELECT statement
    async fn create_view_as(&self, name: &str, select: &str) -> DbResult<()>;

    /// Create a table from a SELECT statement, optionally replacing it
    async fn create_table_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()>;

    /// Merge the SELECT's rows into an existing table, overwriting rows
    /// whose unique key already exists
    async fn merge_upsert(&self, table: &str, select: &str, unique_key: &str) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Row count of a query's result
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Maximum value of a column in a table, as a string; None on empty
    async fn query_max(&self, table: &str, column: &str) -> DbResult<Option<String>>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// Backend identifier for logging
    fn backend_type(&self) -> &'static str;
}
