use chrono::Utc;

use super::schema::Database;
use super::types::{DatabaseError, StateEntry};

impl Database {
    // ========================================================================
    // Client State Operations
    // ========================================================================

    /// Get a single value by key, or `None` if it was never set (or deleted).
    pub async fn get_state(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM client_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Get a value together with its last-write timestamp.
    pub async fn get_state_entry(&self, key: &str) -> Result<Option<StateEntry>, DatabaseError> {
        let row: Option<(String, String, i64)> =
            sqlx::query_as("SELECT key, value, updated_at FROM client_state WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(key, value, updated_at)| StateEntry {
            key,
            value,
            updated_at,
        }))
    }

    /// Set a value (UPSERT). Last writer wins.
    pub async fn set_state(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO client_state (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a key. Returns true if a row was removed.
    pub async fn delete_state(&self, key: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM client_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
