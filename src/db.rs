use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;

use crate::storage::{CachedPayload, Storage};

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed response cache.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a SQLite file in
    // the user's cache directory.
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        let pool = AnyPoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }
}

#[async_trait::async_trait]
impl Storage for Database {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<CachedPayload>> {
        let row = sqlx::query_as::<_, (String, String, i64, i64)>(
            "SELECT key, payload, stored_at, expires_at FROM response_cache WHERE key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(key, payload, stored_at, expires_at)| CachedPayload { key, payload, stored_at, expires_at }))
    }

    async fn put_cache(&self, entry: &CachedPayload) -> Result<()> {
        sqlx::query(
            "INSERT INTO response_cache(key, payload, stored_at, expires_at) VALUES (?, ?, ?, ?)\n             ON CONFLICT(key) DO UPDATE SET payload=excluded.payload, stored_at=excluded.stored_at, expires_at=excluded.expires_at",
        )
        .bind(&entry.key)
        .bind(&entry.payload)
        .bind(entry.stored_at)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await?;
        sqlx::query("DELETE FROM response_cache WHERE expires_at <= ?")
            .bind(entry.stored_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_cache_prefix(&self, prefix: Option<&str>) -> Result<u64> {
        let result = if let Some(p) = prefix {
            // Exact, case-sensitive prefix match; LIKE would fold case and treat `_`/`%` as wildcards.
            sqlx::query("DELETE FROM response_cache WHERE substr(key, 1, length(?)) = ?")
                .bind(p)
                .bind(p)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("DELETE FROM response_cache")
                .execute(&self.pool)
                .await?
        };
        Ok(result.rows_affected())
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("com", "tubitv", "tubi-addon")
        .context("unable to determine cache directory for default sqlite path")?;
    let mut path: PathBuf = proj.cache_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating cache dir: {}", path.display()))?;
    path.push("responses.db");
    Ok(sqlite_url_for(&path))
}

pub fn sqlite_url_for(path: &std::path::Path) -> String {
    // Encode spaces in the path for a valid sqlite URL
    let path_str = path.to_string_lossy().replace(' ', "%20");
    format!("sqlite://{path_str}?mode=rwc")
}
