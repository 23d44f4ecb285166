//! Database transaction utilities
//!
//! Multi-statement writes (batch registration) go through [`TransactionGuard`] so that an
//! early return rolls everything back.

use inspecta_core::AppError;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// A database transaction wrapper that handles commit/rollback explicitly
///
/// Dropping the guard without committing rolls the transaction back (sqlx issues the
/// rollback when the inner transaction is dropped).
///
/// # Example
///
/// ```ignore
/// use inspecta_db::TransactionGuard;
///
/// async fn example(pool: &sqlx::PgPool) -> Result<(), inspecta_core::AppError> {
///     let mut tx = TransactionGuard::begin(pool).await?;
///     sqlx::query("UPDATE inspections SET version = version + 1 WHERE id = 1")
///         .execute(tx.executor()?)
///         .await?;
///     tx.commit().await
/// }
/// ```
pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Postgres>>,
}

impl<'a> TransactionGuard<'a> {
    /// Begin a new database transaction
    pub async fn begin(pool: &'a PgPool) -> Result<Self, AppError> {
        let transaction = pool.begin().await?;
        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Connection to run statements on inside the transaction
    pub fn executor(&mut self) -> Result<&mut PgConnection, AppError> {
        match self.transaction.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(AppError::Internal(
                "Transaction was already committed or rolled back".to_string(),
            )),
        }
    }

    /// Commit the transaction
    pub async fn commit(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            tracing::debug!("Transaction dropped without commit - rolling back");
        }
    }
}
