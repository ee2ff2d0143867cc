use chrono::Utc;
use sqlx::SqliteConnection;

use crate::error::AppResult;

/// Fans a notification out to every admin account. Runs on the caller's
/// connection so it can participate in an open transaction.
pub async fn notify_admins(
    conn: &mut SqliteConnection,
    notification_type: &str,
    message: &str,
) -> AppResult<()> {
    let admin_ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE role = 'admin'")
        .fetch_all(&mut *conn)
        .await?;

    let now = Utc::now();
    for (user_id,) in admin_ids {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, notification_type, message, is_read, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(message)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
