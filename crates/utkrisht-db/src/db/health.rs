use utkrisht_core::AppError;
use sqlx::PgPool;

/// Connectivity probe used by the readiness endpoint
#[async_trait::async_trait]
pub trait DatabaseHealthTrait: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PoolHealth {
    pool: PgPool,
}

impl PoolHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DatabaseHealthTrait for PoolHealth {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
