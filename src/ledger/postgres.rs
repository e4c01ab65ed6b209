use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::{DrinkKey, LedgerError, LedgerStore, WeekDrink};
use crate::config::LedgerConfig;

/// Weekly ledger backed by the `intake_weeks` table, one row per
/// (user, week, brand, drink). Conflicting concurrent transactions are
/// retried a bounded number of times with jittered exponential backoff.
pub struct PgLedgerStore {
    db: PgPool,
    retry: LedgerConfig,
}

impl PgLedgerStore {
    pub fn new(db: PgPool, retry: LedgerConfig) -> Self {
        Self { db, retry }
    }

    async fn try_apply(
        &self,
        user_id: Uuid,
        week_id: &str,
        key: &DrinkKey,
        count_delta: i64,
        units_delta: f64,
    ) -> Result<(), LedgerError> {
        let mut tx = self.db.begin().await.map_err(classify)?;

        sqlx::query(
            r#"
            INSERT INTO intake_weeks (user_id, week_id, brand_name, drink_name, count, units)
            VALUES ($1, $2, $3, $4, GREATEST($5, 0), GREATEST($6, 0))
            ON CONFLICT (user_id, week_id, brand_name, drink_name)
            DO UPDATE SET count = GREATEST(intake_weeks.count + $5, 0),
                          units = GREATEST(intake_weeks.units + $6, 0),
                          updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(week_id)
        .bind(&key.brand_name)
        .bind(&key.drink_name)
        .bind(count_delta)
        .bind(units_delta)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        // A zero count never survives the transaction; once the last row for
        // the week is gone the week itself is gone.
        sqlx::query(
            r#"
            DELETE FROM intake_weeks
            WHERE user_id = $1 AND week_id = $2
              AND brand_name = $3 AND drink_name = $4
              AND count <= 0
            "#,
        )
        .bind(user_id)
        .bind(week_id)
        .bind(&key.brand_name)
        .bind(&key.drink_name)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn apply_delta(
        &self,
        user_id: Uuid,
        week_id: &str,
        key: &DrinkKey,
        count_delta: i64,
        units_delta: f64,
    ) -> Result<(), LedgerError> {
        let mut attempt: u32 = 0;
        loop {
            match self
                .try_apply(user_id, week_id, key, count_delta, units_delta)
                .await
            {
                Ok(()) => return Ok(()),
                Err(LedgerError::Conflict) if attempt + 1 < self.retry.max_attempts => {
                    let base = backoff_base_ms(self.retry.backoff_ms, attempt);
                    let jitter = rand::thread_rng().gen_range(0..=self.retry.backoff_ms);
                    warn!(
                        user_id = %user_id,
                        week_id = %week_id,
                        drink = %key.drink_name,
                        attempt,
                        "ledger transaction conflict, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(base + jitter)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_week(&self, user_id: Uuid, week_id: &str) -> Result<Vec<WeekDrink>, LedgerError> {
        let rows = sqlx::query_as::<_, WeekDrink>(
            r#"
            SELECT brand_name, drink_name, count, units
            FROM intake_weeks
            WHERE user_id = $1 AND week_id = $2
            ORDER BY brand_name, drink_name
            "#,
        )
        .bind(user_id)
        .bind(week_id)
        .fetch_all(&self.db)
        .await
        .map_err(classify)?;
        Ok(rows)
    }
}

/// Doubles per attempt; the exponent is capped and the multiply saturates so
/// an operator-supplied attempt limit can never overflow the delay.
fn backoff_base_ms(backoff_ms: u64, attempt: u32) -> u64 {
    backoff_ms.saturating_mul(1u64 << attempt.min(16))
}

fn classify(e: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(db) = &e {
        // serialization_failure / deadlock_detected
        if matches!(db.code().as_deref(), Some("40001") | Some("40P01")) {
            return LedgerError::Conflict;
        }
    }
    LedgerError::Transport(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_base_ms(50, 0), 50);
        assert_eq!(backoff_base_ms(50, 1), 100);
        assert_eq!(backoff_base_ms(50, 3), 400);
    }

    #[test]
    fn backoff_saturates_on_extreme_attempt_counts() {
        assert_eq!(backoff_base_ms(50, 1000), 50 * (1u64 << 16));
        assert_eq!(backoff_base_ms(u64::MAX, 4), u64::MAX);
    }
}
