use sqlx::PgPool;

use crate::auth::password;
use crate::config::BootstrapAdmin;
use crate::db;
use crate::validation;

/// Create the first admin when the table is empty. Returns whether an admin
/// was created.
pub async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> Result<bool, String> {
    let count = db::admins::count_all(pool)
        .await
        .map_err(|e| format!("Failed to count admins: {e}"))?;
    if count > 0 {
        return Ok(false);
    }

    if !validation::is_email(admin.email.trim()) {
        return Err(format!("Bootstrap admin email '{}' is invalid", admin.email));
    }
    if admin.password.len() < 8 {
        return Err("Bootstrap admin password must be at least 8 characters".to_string());
    }

    let pw_hash = password::hash_async(admin.password.clone()).await?;
    let created = db::admins::create(pool, &admin.email, &pw_hash, &admin.name, "admin")
        .await
        .map_err(|e| format!("Failed to create bootstrap admin: {e}"))?;

    tracing::info!("Bootstrap admin created: {}", created.email);
    Ok(true)
}
