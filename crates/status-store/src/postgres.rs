use async_trait::async_trait;
use sqlx::PgPool;

use crate::{Persistence, ReferenceId, Result, Status, StoreError};

/// PostgreSQL-backed status store implementation.
#[derive(Clone)]
pub struct PostgresStatusStore {
    pool: PgPool,
}

impl PostgresStatusStore {
    /// Creates a new PostgreSQL status store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn decode(key: &ReferenceId, code: i16) -> Result<Status> {
        Status::try_from(code).map_err(|source| StoreError::Decode {
            key: key.clone(),
            source,
        })
    }
}

#[async_trait]
impl Persistence for PostgresStatusStore {
    async fn load(&self, key: &ReferenceId) -> Result<Status> {
        let code: Option<i16> =
            sqlx::query_scalar("SELECT status FROM transfer_status WHERE reference_id = $1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match code {
            Some(code) => Self::decode(key, code),
            None => Ok(Status::default()),
        }
    }

    #[tracing::instrument(skip(self, key), fields(reference_id = %key))]
    async fn compare_and_swap(
        &self,
        key: &ReferenceId,
        new: Status,
        expected: Status,
    ) -> Result<()> {
        // A missing row reads as Started, so only a swap from Started may insert.
        let result = if expected == Status::default() {
            sqlx::query(
                r#"
                INSERT INTO transfer_status (reference_id, status)
                VALUES ($1, $2)
                ON CONFLICT (reference_id) DO UPDATE
                    SET status = EXCLUDED.status, updated_at = NOW()
                    WHERE transfer_status.status = $3
                "#,
            )
            .bind(key.as_str())
            .bind(new.as_i16())
            .bind(expected.as_i16())
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE transfer_status
                SET status = $2, updated_at = NOW()
                WHERE reference_id = $1 AND status = $3
                "#,
            )
            .bind(key.as_str())
            .bind(new.as_i16())
            .bind(expected.as_i16())
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            let actual = self.load(key).await?;
            metrics::counter!("status_store_conflicts_total").increment(1);
            tracing::debug!(%expected, %actual, "compare-and-swap conflict");
            return Err(StoreError::Conflict {
                key: key.clone(),
                expected,
                actual,
            });
        }

        Ok(())
    }
}
