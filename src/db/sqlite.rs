use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

use crate::db::KeyValueStore;
use crate::error::StorageError;

/// Key-value store backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    db: SqlitePool,
}

impl SqliteKeyValueStore {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Runs migrations on `pool` before handing it out.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { db: pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value"
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        debug!("wrote {} bytes under {}", value.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> SqliteKeyValueStore {
        // one connection: every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        SqliteKeyValueStore::from_pool(pool)
            .await
            .expect("Failed to run migrations")
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = setup_test_store().await;
        let value = store.get_item("@agenda:appointments").await.expect("Failed to read");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_item_overwrites() {
        let store = setup_test_store().await;

        store.set_item("key", "[]").await.expect("Failed to write");
        store.set_item("key", "[1]").await.expect("Failed to overwrite");

        let value = store.get_item("key").await.expect("Failed to read");
        assert_eq!(value.as_deref(), Some("[1]"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&store.db)
            .await
            .expect("Failed to count rows");
        assert_eq!(rows, 1);
    }
}
