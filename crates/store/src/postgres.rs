use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row as _};

use crate::{KeyValueStore, Result};

/// PostgreSQL-backed store.
///
/// Point reads are served from the `read_entries` table with a single
/// `pk = ANY($1)` query per batch. The pool handles concurrent invocation
/// from many workers; pool sizing is a deployment parameter.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store on an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL with default pool settings.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        let rows = sqlx::query("SELECT pk, payload FROM read_entries WHERE pk = ANY($1)")
            .bind(keys)
            .fetch_all(&self.pool)
            .await?;

        let mut found = HashMap::with_capacity(rows.len());
        for row in rows {
            let pk: String = row.try_get("pk")?;
            let payload: String = row.try_get("payload")?;
            found.insert(pk, payload);
        }
        Ok(found)
    }
}
