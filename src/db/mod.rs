pub mod state_repo;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type Db = SqlitePool;

/// Open (creating if needed) the state database and apply migrations.
pub async fn init_db(path: &std::path::Path) -> anyhow::Result<Db> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database; every connection to `:memory:`
/// would otherwise see its own empty database.
pub async fn init_memory_db() -> anyhow::Result<Db> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}
