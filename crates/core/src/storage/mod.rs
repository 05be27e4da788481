use crate::config::Settings;
use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};

const MAX_CONNECTIONS: u32 = 5;

/// Connects the optional document/record store. Nothing on the request path reads from it yet.
pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let db_url = settings.require_database_url()?;
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")
}

pub async fn ping(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("database ping failed")?;
    Ok(())
}
