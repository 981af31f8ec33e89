//! PostgreSQL store
//!
//! Every state-changing method runs in one transaction that also appends the
//! audit entry, so a failed append rolls the business write back.

mod assets;
mod audit;
mod loans;
mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::Store;
use crate::error::AppResult;

#[derive(Clone)]
pub struct PgRepository {
    pool: Pool<Postgres>,
}

impl PgRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Check if an error is a unique constraint violation
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
