use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::error::{AppError, AppResult};

/// Snapshots a row into the `backups` table before it is deleted. Callers run
/// this inside the same transaction as the DELETE so the snapshot and the
/// removal commit together.
pub async fn snapshot_row<T: Serialize>(
    conn: &mut SqliteConnection,
    table_name: &str,
    row_id: i64,
    row: &T,
    deleted_by: Option<i64>,
) -> AppResult<()> {
    let data = serde_json::to_string(row)
        .map_err(|e| AppError::Internal(format!("Failed to serialize backup: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO backups (table_name, row_id, data, deleted_by, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(table_name)
    .bind(row_id)
    .bind(data)
    .bind(deleted_by)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}
