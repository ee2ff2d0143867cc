use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::AuthService;

/// Provisions the initial admin account on first run, outside the request
/// path. The generated credential is emitted once on the startup log and is
/// never stored in plain text.
pub async fn ensure_admin(pool: &SqlitePool) -> AppResult<()> {
    let admins: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await?;

    if admins.0 > 0 {
        return Ok(());
    }

    let password = generate_password(16);
    let password_hash = AuthService::hash_password(&password)?;

    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role, created_at)
        VALUES ('admin', ?, 'admin', ?)
        "#,
    )
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::warn!(
        "Provisioned initial admin account 'admin'. One-time password: {} (change it after first login)",
        password
    );

    Ok(())
}

pub fn generate_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
